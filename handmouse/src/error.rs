//! Error types for the pointing engine.
//!
//! Every error carries an [`ErrorKind`] so callers can tell a condition that
//! only spoils the current frame or command from one that should end the
//! session.

use thiserror::Error;

/// How an error affects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Spoils one frame or one command; processing continues with the next frame.
    Transient,
    /// The embedding application should shut down.
    Fatal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Fatal => "fatal",
        }
    }
}

/// Failure reported by the cursor/button driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// The driver refused the command because the cursor reached a protected
    /// screen position (e.g. a corner).
    #[error("fail-safe triggered at ({x:.0}, {y:.0})")]
    FailSafe { x: f64, y: f64 },

    /// The driver cannot reach the OS input layer at all.
    #[error("pointer driver unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a landmark frame source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("frame source read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame source closed: {0}")]
    Closed(String),
}

/// Failure loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine-level error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Source(#[from] SourceError),

    /// A detected hand did not carry a full landmark set.
    #[error("malformed hand: {points} landmarks")]
    MalformedHand { points: usize },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Driver(DriverError::FailSafe { .. }) => ErrorKind::Transient,
            Self::Driver(DriverError::Unavailable(_)) => ErrorKind::Fatal,
            Self::Source(_) => ErrorKind::Fatal,
            Self::MalformedHand { .. } => ErrorKind::Transient,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_safe_is_transient() {
        let err = EngineError::from(DriverError::FailSafe { x: 0.0, y: 0.0 });
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.is_transient());
    }

    #[test]
    fn test_unavailable_driver_is_fatal() {
        let err = EngineError::from(DriverError::Unavailable("no display".into()));
        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert_eq!(err.to_string(), "pointer driver unavailable: no display");
    }

    #[test]
    fn test_source_errors_are_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert_eq!(EngineError::from(SourceError::Io(io)).kind(), ErrorKind::Fatal);
        let closed = SourceError::Closed("camera".into());
        assert_eq!(EngineError::from(closed).kind(), ErrorKind::Fatal);
    }

    #[test]
    fn test_malformed_hand_is_transient() {
        let err = EngineError::MalformedHand { points: 3 };
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "malformed hand: 3 landmarks");
    }

    #[test]
    fn test_fail_safe_message() {
        let err = DriverError::FailSafe { x: 0.2, y: 1079.6 };
        assert_eq!(err.to_string(), "fail-safe triggered at (0, 1080)");
    }
}
