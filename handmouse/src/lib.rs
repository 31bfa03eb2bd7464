//! handmouse - hand-gesture pointer engine.
//!
//! Turns per-frame hand landmarks from a pose estimator into relative cursor
//! motion, a held left button, and right clicks. The movement hand drives
//! the cursor while its index and thumb pinch; the click hand's index pinch
//! holds the left button and its middle pinch right-clicks.

pub mod clicks;
pub mod config;
pub mod control;
pub mod driver;
pub mod error;
pub mod fingers;
pub mod fps;
pub mod landmarks;
pub mod motion;
pub mod orchestrator;
pub mod roles;
pub mod source;

pub use config::{Config, GestureSet, SharedConfig};
pub use driver::{MouseButton, PointerCommand, PointerDriver, RecordingDriver, ScreenSize};
pub use error::{ConfigError, DriverError, EngineError, ErrorKind, SourceError};
pub use landmarks::{HandLabel, Handedness, Landmark, LandmarkFrame, LandmarkSet, Point};
pub use orchestrator::FrameOrchestrator;
pub use source::{ChannelSource, FrameSource, JsonLinesSource, VecSource};
