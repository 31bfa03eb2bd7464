//! Per-frame sequencing of role resolution, finger classification, motion
//! and click gestures.
//!
//! One [`FrameOrchestrator`] is one pointing session. It owns the driver and
//! all gesture state; nothing is global, so independent sessions can run
//! side by side.

use std::borrow::Cow;

use tracing::{debug, info, warn};

use crate::clicks::ClickMachine;
use crate::config::Config;
use crate::driver::{MouseButton, PointerCommand, PointerDriver, ScreenSize};
use crate::error::EngineError;
use crate::fingers::{Finger, FingerState};
use crate::fps::FpsMeter;
use crate::landmarks::{LandmarkFrame, LandmarkSet};
use crate::motion::{tracked_point, MotionMapper, MotionOutput};
use crate::roles::resolve_roles;

/// A pointing session driven one landmark frame at a time.
pub struct FrameOrchestrator<D: PointerDriver> {
    driver: D,
    screen: ScreenSize,
    motion: MotionMapper,
    clicks: ClickMachine,
    /// Consecutive frames with no usable hand.
    frames_without_hand: u32,
    /// Finger states from the last frame, for status output.
    movement_fingers: Option<FingerState>,
    click_fingers: Option<FingerState>,
    /// Freeze pose held on the movement hand. Only its rising edge releases.
    frozen: bool,
    fps: FpsMeter,
}

impl<D: PointerDriver> FrameOrchestrator<D> {
    /// Start a session on `driver`, querying its screen size once.
    pub fn new(driver: D) -> Result<Self, EngineError> {
        let screen = driver.screen_size()?;
        info!("Session started on {}x{} screen", screen.width, screen.height);
        Ok(Self {
            driver,
            screen,
            motion: MotionMapper::new(),
            clicks: ClickMachine::new(),
            frames_without_hand: 0,
            movement_fingers: None,
            click_fingers: None,
            frozen: false,
            fps: FpsMeter::default(),
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn motion(&self) -> &MotionMapper {
        &self.motion
    }

    pub fn clicks(&self) -> &ClickMachine {
        &self.clicks
    }

    pub fn fps(&self) -> &FpsMeter {
        &self.fps
    }

    /// Process one frame against a configuration snapshot.
    ///
    /// Transient conditions (malformed hands, driver fail-safe) are logged
    /// and absorbed. Only fatal errors are returned.
    pub fn process_frame(
        &mut self,
        frame: &LandmarkFrame,
        config: &Config,
    ) -> Result<(), EngineError> {
        let config = config.sanitized();
        self.fps.tick(frame.timestamp_s);

        let hands = usable_hands(&frame.hands);
        if hands.is_empty() {
            return self.on_no_hands(&config);
        }
        self.frames_without_hand = 0;

        let roles = resolve_roles(&hands, config.invert_hands, config.handedness_min_confidence);
        self.movement_fingers = roles
            .movement
            .map(|h| FingerState::classify(h, config.pinch_threshold));
        self.click_fingers = roles
            .click
            .map(|h| FingerState::classify(h, config.pinch_threshold));

        self.run_motion(roles.movement, frame.timestamp_s, &config)?;
        self.run_clicks(&config)
    }

    fn run_motion(
        &mut self,
        hand: Option<&LandmarkSet>,
        timestamp_s: f64,
        config: &Config,
    ) -> Result<(), EngineError> {
        let (hand, fingers) = match (hand, self.movement_fingers) {
            (Some(h), Some(f)) => (h, f),
            _ => {
                self.frozen = false;
                return self.deactivate_motion();
            }
        };

        let frozen = config.gestures.freeze && fingers.is_frozen();
        let fired = frozen && !self.frozen;
        self.frozen = frozen;
        if frozen {
            self.motion.deactivate();
            if fired {
                info!("Cursor frozen");
                return self.force_release();
            }
            return Ok(());
        }

        if !fingers.pinched(Finger::Index) {
            return self.deactivate_motion();
        }
        let Some(point) = tracked_point(hand) else {
            return self.deactivate_motion();
        };

        match self.motion.update(point, timestamp_s, self.screen, config) {
            MotionOutput::Move { dx, dy } => self.dispatch(PointerCommand::MoveBy { dx, dy }),
            MotionOutput::Anchored => {
                if let Ok((x, y)) = self.driver.position() {
                    debug!("Motion engaged with cursor at ({:.0}, {:.0})", x, y);
                }
                Ok(())
            }
            MotionOutput::DeadZone { .. } | MotionOutput::Stalled => Ok(()),
        }
    }

    fn run_clicks(&mut self, config: &Config) -> Result<(), EngineError> {
        let commands = match self.click_fingers {
            Some(fingers) => self.clicks.update(&fingers, &config.gestures),
            None => self.clicks.on_hand_lost(),
        };
        for command in commands {
            self.dispatch(command)?;
        }
        Ok(())
    }

    fn on_no_hands(&mut self, config: &Config) -> Result<(), EngineError> {
        self.frames_without_hand = self.frames_without_hand.saturating_add(1);
        self.movement_fingers = None;
        self.click_fingers = None;
        self.frozen = false;

        if self.frames_without_hand < config.hand_loss_grace_frames {
            debug!(
                "No hands for {} frame(s), within grace of {}",
                self.frames_without_hand, config.hand_loss_grace_frames
            );
            return Ok(());
        }
        if self.frames_without_hand == config.hand_loss_grace_frames {
            info!("Hands lost after {} frame(s), resetting", self.frames_without_hand);
        }
        self.motion.deactivate();
        for command in self.clicks.on_hand_lost() {
            self.dispatch(command)?;
        }
        Ok(())
    }

    /// Movement stopped: clear the filter, and release a drag if motion was live.
    fn deactivate_motion(&mut self) -> Result<(), EngineError> {
        if self.motion.deactivate() {
            return self.force_release();
        }
        Ok(())
    }

    fn force_release(&mut self) -> Result<(), EngineError> {
        match self.clicks.release_hold() {
            Some(command) => self.dispatch(command),
            None => Ok(()),
        }
    }

    /// Send one command, absorbing transient driver failures.
    ///
    /// A refused left release leaves the button held, so the hold is
    /// restored and the next release trigger retries it.
    fn dispatch(&mut self, command: PointerCommand) -> Result<(), EngineError> {
        let err = match command.apply(&mut self.driver) {
            Ok(()) => return Ok(()),
            Err(e) => EngineError::from(e),
        };
        if !err.is_transient() {
            return Err(err);
        }
        warn!(
            "Driver refused {} ({}): {}",
            command.to_sexp(),
            err.kind().as_str(),
            err
        );
        if command == PointerCommand::Release(MouseButton::Left) {
            self.clicks.restore_hold();
        }
        Ok(())
    }

    /// Manual reset: release anything held and drop all gesture state.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        info!("Session reset");
        self.motion.deactivate();
        self.frames_without_hand = 0;
        self.movement_fingers = None;
        self.click_fingers = None;
        self.frozen = false;
        for command in self.clicks.on_hand_lost() {
            self.dispatch(command)?;
        }
        Ok(())
    }

    /// S-expression for status output.
    pub fn status_sexp(&self) -> String {
        let fingers = |f: &Option<FingerState>| match f {
            Some(state) => state.status_sexp(),
            None => "nil".to_string(),
        };
        format!(
            "(:cursor {} :hands-missing {} :fps {} :motion {} :clicks {} :movement-hand {} :click-hand {})",
            if self.frozen { ":frozen" } else { ":active" },
            self.frames_without_hand,
            self.fps.as_int(),
            self.motion.status_sexp(),
            self.clicks.status_sexp(),
            fingers(&self.movement_fingers),
            fingers(&self.click_fingers),
        )
    }
}

/// Hands with a full landmark set; malformed ones are logged and dropped.
fn usable_hands(hands: &[LandmarkSet]) -> Cow<'_, [LandmarkSet]> {
    if hands.iter().all(LandmarkSet::is_well_formed) {
        return Cow::Borrowed(hands);
    }
    let mut usable = Vec::with_capacity(hands.len());
    for hand in hands {
        if hand.is_well_formed() {
            usable.push(hand.clone());
        } else {
            warn!(
                "Skipping hand: {}",
                EngineError::MalformedHand {
                    points: hand.points.len()
                }
            );
        }
    }
    Cow::Owned(usable)
}

// ── Tests ──────────────────────────────────────────────────
