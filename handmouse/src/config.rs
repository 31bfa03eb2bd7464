//! Engine configuration and the shared handle a control surface mutates.
//!
//! The frame loop takes one sanitized [`Config`] snapshot per frame so a
//! concurrent update never lands halfway through a frame's math.

use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

// ── Gesture handlers ───────────────────────────────────────

/// Optional gesture handlers the engine runs. Decided by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSet {
    /// All-fingers-up with thumb down on the movement hand freezes the cursor.
    pub freeze: bool,
    /// Index pinch on the click hand holds the left button.
    pub left_hold: bool,
    /// Middle pinch on the click hand fires a right click.
    pub right_click: bool,
}

impl Default for GestureSet {
    fn default() -> Self {
        Self {
            freeze: true,
            left_hold: true,
            right_click: true,
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Tunable engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// EMA smoothing factor α (0.0-1.0). Weight of the newest sample.
    pub smoothing: f64,
    /// Multiplier applied to smoothed displacement.
    pub sensitivity: f64,
    /// Deltas shorter than this (pixels) are treated as jitter.
    pub dead_zone_px: f64,
    /// Fingertip-to-thumb distance (normalized) below which a pinch registers.
    pub pinch_threshold: f64,
    /// Swap the movement and click hands.
    pub invert_hands: bool,
    /// Consecutive no-hand frames before all gesture state is dropped.
    pub hand_loss_grace_frames: u32,
    /// Minimum handedness score for a label to be trusted.
    pub handedness_min_confidence: f64,
    /// Enabled gesture handlers.
    pub gestures: GestureSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smoothing: 0.3,
            sensitivity: 0.6,
            dead_zone_px: 10.0,
            pinch_threshold: 0.05,
            invert_hands: false,
            hand_loss_grace_frames: 1,
            handedness_min_confidence: 0.5,
            gestures: GestureSet::default(),
        }
    }
}

/// Clamp `value` into `[min, max]`, falling back to `default` when not finite.
fn clamp_field(name: &str, value: f64, min: f64, max: f64, default: f64) -> f64 {
    let clamped = if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    };
    if clamped != value {
        debug!("Config: {} {} out of range, using {}", name, value, clamped);
    }
    clamped
}

impl Config {
    /// Copy with every out-of-range value pulled to its nearest valid value.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            smoothing: clamp_field("smoothing", self.smoothing, 0.0, 1.0, defaults.smoothing),
            sensitivity: clamp_field(
                "sensitivity",
                self.sensitivity,
                0.0,
                f64::MAX,
                defaults.sensitivity,
            ),
            dead_zone_px: clamp_field(
                "dead_zone_px",
                self.dead_zone_px,
                0.0,
                f64::MAX,
                defaults.dead_zone_px,
            ),
            pinch_threshold: clamp_field(
                "pinch_threshold",
                self.pinch_threshold,
                0.0,
                f64::MAX,
                defaults.pinch_threshold,
            ),
            invert_hands: self.invert_hands,
            hand_loss_grace_frames: self.hand_loss_grace_frames.max(1),
            handedness_min_confidence: clamp_field(
                "handedness_min_confidence",
                self.handedness_min_confidence,
                0.0,
                1.0,
                defaults.handedness_min_confidence,
            ),
            gestures: self.gestures,
        }
    }

    /// Load from a JSON file. Missing keys take their defaults; a missing
    /// file yields the default config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Config: loaded {}", path.display());
        Ok(config)
    }

    /// Render as an s-expression plist for the control surface.
    pub fn to_sexp(&self) -> String {
        let flag = |b: bool| if b { "t" } else { "nil" };
        format!(
            "(:smoothing {:.3} :sensitivity {:.3} :dead-zone {:.1} :pinch-threshold {:.3} :invert-hands {} :grace-frames {} :min-confidence {:.2} :freeze {} :left-hold {} :right-click {})",
            self.smoothing,
            self.sensitivity,
            self.dead_zone_px,
            self.pinch_threshold,
            flag(self.invert_hands),
            self.hand_loss_grace_frames,
            self.handedness_min_confidence,
            flag(self.gestures.freeze),
            flag(self.gestures.left_hold),
            flag(self.gestures.right_click),
        )
    }
}

// ── Shared handle ──────────────────────────────────────────

/// Externally mutable configuration shared between the frame loop and a
/// control surface.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<Config>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// A consistent, sanitized point-in-time copy.
    pub fn snapshot(&self) -> Config {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.sanitized()
    }

    /// Apply a mutation atomically with respect to `snapshot`.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.smoothing, 0.3);
        assert_eq!(config.sensitivity, 0.6);
        assert_eq!(config.dead_zone_px, 10.0);
        assert_eq!(config.pinch_threshold, 0.05);
        assert!(!config.invert_hands);
        assert_eq!(config.hand_loss_grace_frames, 1);
        assert_eq!(config.gestures, GestureSet::default());
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_sanitize_clamps() {
        let config = Config {
            smoothing: 1.7,
            sensitivity: -2.0,
            dead_zone_px: -1.0,
            pinch_threshold: -0.1,
            hand_loss_grace_frames: 0,
            handedness_min_confidence: 3.0,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.smoothing, 1.0);
        assert_eq!(config.sensitivity, 0.0);
        assert_eq!(config.dead_zone_px, 0.0);
        assert_eq!(config.pinch_threshold, 0.0);
        assert_eq!(config.hand_loss_grace_frames, 1);
        assert_eq!(config.handedness_min_confidence, 1.0);

        let low = Config {
            smoothing: -0.5,
            ..Config::default()
        };
        assert_eq!(low.sanitized().smoothing, 0.0);
    }

    #[test]
    fn test_sanitize_non_finite_uses_default() {
        let config = Config {
            smoothing: f64::NAN,
            sensitivity: f64::INFINITY,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.smoothing, 0.3);
        assert_eq!(config.sensitivity, 0.6);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sensitivity": 1.5, "invert_hands": true, "gestures": {{"right_click": false}}}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sensitivity, 1.5);
        assert!(config.invert_hands);
        assert_eq!(config.smoothing, 0.3);
        assert!(config.gestures.freeze);
        assert!(config.gestures.left_hold);
        assert!(!config.gestures.right_click);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_to_sexp() {
        let sexp = Config::default().to_sexp();
        assert!(sexp.contains(":smoothing 0.300"));
        assert!(sexp.contains(":dead-zone 10.0"));
        assert!(sexp.contains(":invert-hands nil"));
        assert!(sexp.contains(":right-click t"));
    }

    #[test]
    fn test_shared_snapshot_is_sanitized_copy() {
        let shared = SharedConfig::new(Config::default());
        shared.update(|c| c.smoothing = 4.0);
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.smoothing, 1.0);

        shared.update(|c| c.sensitivity = 2.0);
        assert_eq!(snapshot.sensitivity, 0.6);
        assert_eq!(shared.snapshot().sensitivity, 2.0);
    }

    #[test]
    fn test_shared_across_threads() {
        let shared = SharedConfig::default();
        let writer = shared.clone();
        std::thread::spawn(move || writer.update(|c| c.invert_hands = true))
            .join()
            .unwrap();
        assert!(shared.snapshot().invert_hands);
    }
}
