//! Pinch-gated relative cursor motion.
//!
//! While the movement hand holds an index-thumb pinch, the midpoint of its
//! ring and pinky tips is mapped to screen pixels, smoothed with an
//! exponential moving average, and the change in the smoothed position
//! (scaled by sensitivity) becomes a relative cursor move. The ring and
//! pinky are tracked because index and thumb are busy holding the pinch.

use tracing::{debug, trace};

use crate::config::Config;
use crate::driver::ScreenSize;
use crate::landmarks::{Landmark, LandmarkSet, Point};

/// Point on the movement hand that drives the cursor.
pub fn tracked_point(hand: &LandmarkSet) -> Option<Point> {
    let ring = hand.point(Landmark::RingTip)?;
    let pinky = hand.point(Landmark::PinkyTip)?;
    Some(ring.midpoint(&pinky))
}

/// Filter state for one activation. Cleared on every deactivation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionFilterState {
    /// Last smoothed position in screen pixels.
    pub smoothed: Option<(f64, f64)>,
    /// Timestamp (seconds) of the last frame that advanced the filter.
    pub prev_time_s: Option<f64>,
    /// Smoothing factor used on the last update.
    pub alpha: f64,
    /// Whether a pinch is currently driving motion.
    pub active: bool,
}

/// Result of one motion update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionOutput {
    /// First frame of an activation: position recorded, no motion.
    Anchored,
    /// Displacement large enough to send to the driver.
    Move { dx: f64, dy: f64 },
    /// Displacement inside the dead-zone; filter advanced, nothing sent.
    DeadZone { dx: f64, dy: f64 },
    /// Timestamp did not advance; state untouched.
    Stalled,
}

impl MotionOutput {
    /// Delta to hand to the driver, if any.
    pub fn delta(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Move { dx, dy } => Some((dx, dy)),
            _ => None,
        }
    }
}

/// Converts tracked hand positions into relative cursor deltas.
#[derive(Debug, Default)]
pub struct MotionMapper {
    state: MotionFilterState,
}

impl MotionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MotionFilterState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Advance with the tracked point (normalized) of a pinching movement hand.
    pub fn update(
        &mut self,
        tracked: Point,
        timestamp_s: f64,
        screen: ScreenSize,
        config: &Config,
    ) -> MotionOutput {
        let raw = screen.to_pixels(tracked.x, tracked.y);
        let alpha = config.smoothing.clamp(0.0, 1.0);

        let (prev, prev_time) = match (self.state.smoothed, self.state.prev_time_s) {
            (Some(p), Some(t)) => (p, t),
            _ => {
                self.state = MotionFilterState {
                    smoothed: Some(raw),
                    prev_time_s: Some(timestamp_s),
                    alpha,
                    active: true,
                };
                debug!("Motion: anchored at ({:.1}, {:.1})", raw.0, raw.1);
                return MotionOutput::Anchored;
            }
        };

        if timestamp_s - prev_time <= 0.0 {
            trace!("Motion: non-advancing timestamp {:.4}s, skipped", timestamp_s);
            return MotionOutput::Stalled;
        }

        let smoothed = (
            alpha * raw.0 + (1.0 - alpha) * prev.0,
            alpha * raw.1 + (1.0 - alpha) * prev.1,
        );
        let dx = (smoothed.0 - prev.0) * config.sensitivity;
        let dy = (smoothed.1 - prev.1) * config.sensitivity;

        self.state.smoothed = Some(smoothed);
        self.state.prev_time_s = Some(timestamp_s);
        self.state.alpha = alpha;

        let magnitude = dx.hypot(dy);
        if magnitude < config.dead_zone_px || magnitude == 0.0 {
            trace!("Motion: {:.2}px inside dead-zone", magnitude);
            MotionOutput::DeadZone { dx, dy }
        } else {
            MotionOutput::Move { dx, dy }
        }
    }

    /// Clear all filter state. Returns whether motion was active.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.state.active;
        if was_active {
            debug!("Motion: deactivated");
        }
        self.state = MotionFilterState::default();
        was_active
    }

    /// S-expression for status output.
    pub fn status_sexp(&self) -> String {
        let smoothed = match self.state.smoothed {
            Some((x, y)) => format!("({:.1} {:.1})", x, y),
            None => "nil".to_string(),
        };
        format!(
            "(:active {} :smoothed {} :alpha {:.2})",
            if self.state.active { "t" } else { "nil" },
            smoothed,
            self.state.alpha,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
