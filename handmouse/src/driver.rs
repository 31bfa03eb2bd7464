//! Cursor/button driver contract and a recording implementation.
//!
//! The engine only issues relative motion and button commands. OS-level
//! injection lives behind [`PointerDriver`]; [`RecordingDriver`] simulates a
//! cursor on a fixed screen for dry runs and tests.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::DriverError;

/// Mouse buttons the engine can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Normalized frame coordinates to screen pixels.
    pub fn to_pixels(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.width, y * self.height)
    }
}

/// OS cursor and button injection.
pub trait PointerDriver {
    /// Size of the screen the cursor moves on.
    fn screen_size(&self) -> Result<ScreenSize, DriverError>;

    /// Current cursor position in pixels.
    fn position(&self) -> Result<(f64, f64), DriverError>;

    /// Move the cursor relative to where it currently is.
    fn move_by(&mut self, dx: f64, dy: f64) -> Result<(), DriverError>;

    /// Move the cursor to an absolute position over `duration`.
    fn move_to(&mut self, x: f64, y: f64, duration: Duration) -> Result<(), DriverError>;

    fn button_down(&mut self, button: MouseButton) -> Result<(), DriverError>;

    fn button_up(&mut self, button: MouseButton) -> Result<(), DriverError>;

    /// Press and release as one action.
    fn click(&mut self, button: MouseButton) -> Result<(), DriverError>;
}

// ── Commands ───────────────────────────────────────────────

/// A command produced by the gesture logic for the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerCommand {
    MoveBy { dx: f64, dy: f64 },
    Press(MouseButton),
    Release(MouseButton),
    Click(MouseButton),
}

impl PointerCommand {
    /// Issue this command on `driver`.
    pub fn apply<D: PointerDriver + ?Sized>(&self, driver: &mut D) -> Result<(), DriverError> {
        match *self {
            Self::MoveBy { dx, dy } => driver.move_by(dx, dy),
            Self::Press(button) => driver.button_down(button),
            Self::Release(button) => driver.button_up(button),
            Self::Click(button) => driver.click(button),
        }
    }

    /// S-expression form for logging.
    pub fn to_sexp(&self) -> String {
        match self {
            Self::MoveBy { dx, dy } => format!("(:move-by {:.1} {:.1})", dx, dy),
            Self::Press(b) => format!("(:press :{})", b.as_str()),
            Self::Release(b) => format!("(:release :{})", b.as_str()),
            Self::Click(b) => format!("(:click :{})", b.as_str()),
        }
    }
}

// ── Recording driver ───────────────────────────────────────

/// Everything a [`RecordingDriver`] was asked to do, including absolute moves.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Command(PointerCommand),
    MoveTo { x: f64, y: f64, duration: Duration },
}

/// Simulated pointer: tracks a cursor clamped to the screen, records calls,
/// and optionally trips a fail-safe when the cursor reaches a corner.
#[derive(Debug)]
pub struct RecordingDriver {
    screen: ScreenSize,
    cursor: (f64, f64),
    held: Vec<MouseButton>,
    calls: Vec<RecordedCall>,
    /// Refuse commands once the cursor sits in a screen corner.
    pub fail_safe: bool,
    /// Log each call at info level.
    pub log_calls: bool,
    scripted: Option<DriverError>,
}

/// Distance from a corner (pixels) that trips the fail-safe.
const FAIL_SAFE_MARGIN: f64 = 1.0;

impl RecordingDriver {
    /// A driver with the cursor at screen center.
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            cursor: (screen.width / 2.0, screen.height / 2.0),
            held: Vec::new(),
            calls: Vec::new(),
            fail_safe: false,
            log_calls: false,
            scripted: None,
        }
    }

    /// Make the next call fail with `error` without taking effect.
    pub fn fail_next(&mut self, error: DriverError) {
        self.scripted = Some(error);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Recorded relative-motion and button commands only.
    pub fn commands(&self) -> Vec<PointerCommand> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Command(cmd) => Some(*cmd),
                RecordedCall::MoveTo { .. } => None,
            })
            .collect()
    }

    /// Whether `button` is currently held down.
    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held.contains(&button)
    }

    fn in_corner(&self) -> bool {
        let (x, y) = self.cursor;
        let near = |v: f64, max: f64| v <= FAIL_SAFE_MARGIN || v >= max - 1.0 - FAIL_SAFE_MARGIN;
        near(x, self.screen.width) && near(y, self.screen.height)
    }

    /// Run the common preconditions and record `call` if they pass.
    fn admit(&mut self, call: RecordedCall) -> Result<(), DriverError> {
        if let Some(err) = self.scripted.take() {
            debug!("Recording driver: scripted failure {}", err);
            return Err(err);
        }
        if self.fail_safe && self.in_corner() {
            return Err(DriverError::FailSafe {
                x: self.cursor.0,
                y: self.cursor.1,
            });
        }
        if self.log_calls {
            match &call {
                RecordedCall::Command(cmd) => info!("driver {}", cmd.to_sexp()),
                RecordedCall::MoveTo { x, y, duration } => {
                    info!("driver (:move-to {:.1} {:.1} :ms {})", x, y, duration.as_millis())
                }
            }
        }
        self.calls.push(call);
        Ok(())
    }

    fn place(&mut self, x: f64, y: f64) {
        self.cursor = (
            x.clamp(0.0, self.screen.width - 1.0),
            y.clamp(0.0, self.screen.height - 1.0),
        );
    }
}

impl PointerDriver for RecordingDriver {
    fn screen_size(&self) -> Result<ScreenSize, DriverError> {
        Ok(self.screen)
    }

    fn position(&self) -> Result<(f64, f64), DriverError> {
        Ok(self.cursor)
    }

    fn move_by(&mut self, dx: f64, dy: f64) -> Result<(), DriverError> {
        self.admit(RecordedCall::Command(PointerCommand::MoveBy { dx, dy }))?;
        self.place(self.cursor.0 + dx, self.cursor.1 + dy);
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64, duration: Duration) -> Result<(), DriverError> {
        self.admit(RecordedCall::MoveTo { x, y, duration })?;
        self.place(x, y);
        Ok(())
    }

    fn button_down(&mut self, button: MouseButton) -> Result<(), DriverError> {
        self.admit(RecordedCall::Command(PointerCommand::Press(button)))?;
        if !self.held.contains(&button) {
            self.held.push(button);
        }
        Ok(())
    }

    fn button_up(&mut self, button: MouseButton) -> Result<(), DriverError> {
        self.admit(RecordedCall::Command(PointerCommand::Release(button)))?;
        self.held.retain(|b| *b != button);
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<(), DriverError> {
        self.admit(RecordedCall::Command(PointerCommand::Click(button)))
    }
}

// ── Tests ──────────────────────────────────────────────────
