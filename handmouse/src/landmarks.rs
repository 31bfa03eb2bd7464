//! Hand landmark data structures.
//!
//! Models the 21 normalized landmarks per hand produced by a MediaPipe-style
//! hand pose estimator, plus the optional handedness label it reports.
//! Coordinates are fractions of the (already mirrored) camera frame.

use serde::Deserialize;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in estimator order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl Landmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }
}

// ── Handedness ─────────────────────────────────────────────

/// Handedness label as reported by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum HandLabel {
    Left,
    Right,
}

impl HandLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// The opposite label.
    ///
    /// The estimator labels hands as seen in the mirrored image, so the
    /// user's own hand is the opposite of what it reports.
    pub fn mirrored(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// A handedness classification with its confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handedness {
    pub label: HandLabel,
    /// Classifier confidence (0.0-1.0).
    pub score: f64,
}

// ── Points and sets ────────────────────────────────────────

/// One normalized landmark position. `z` is relative depth and unused by
/// the gesture logic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar (x, y) Euclidean distance.
    pub fn distance_2d(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Planar midpoint.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
            z: (self.z + other.z) / 2.0,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// All landmarks of one detected hand for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    /// Landmark positions indexed by `Landmark`. Should hold exactly
    /// `LANDMARK_COUNT` entries; anything else is treated as malformed.
    pub points: Vec<Point>,
    /// Handedness, when the estimator reported one.
    pub handedness: Option<Handedness>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>, handedness: Option<Handedness>) -> Self {
        Self { points, handedness }
    }

    /// Whether the set has exactly 21 finite points.
    pub fn is_well_formed(&self) -> bool {
        self.points.len() == LANDMARK_COUNT && self.points.iter().all(Point::is_finite)
    }

    /// Position of a landmark, if present.
    pub fn point(&self, landmark: Landmark) -> Option<Point> {
        self.points.get(landmark.index()).copied()
    }

    /// Wrist x-coordinate, used for the unlabeled two-hand heuristic.
    pub fn wrist_x(&self) -> Option<f64> {
        self.point(Landmark::Wrist).map(|p| p.x)
    }
}

/// One frame of detections.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkFrame {
    /// Capture time in seconds on a monotonic clock.
    pub timestamp_s: f64,
    /// Detected hands in estimator order. Empty means no hands detected.
    pub hands: Vec<LandmarkSet>,
}

impl LandmarkFrame {
    pub fn new(timestamp_s: f64, hands: Vec<LandmarkSet>) -> Self {
        Self { timestamp_s, hands }
    }

    /// A frame with no detected hands.
    pub fn empty(timestamp_s: f64) -> Self {
        Self::new(timestamp_s, Vec::new())
    }
}

// ── Wire format ────────────────────────────────────────────

/// JSON form of a frame: `{"t": 0.033, "hands": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct FrameRecord {
    t: f64,
    #[serde(default)]
    hands: Vec<HandRecord>,
}

/// JSON form of one hand. Landmarks are `[x, y]` or `[x, y, z]` arrays.
#[derive(Debug, Deserialize)]
struct HandRecord {
    landmarks: Vec<Vec<f64>>,
    #[serde(default)]
    label: Option<HandLabel>,
    #[serde(default = "default_score")]
    score: f64,
}

fn default_score() -> f64 {
    1.0
}

impl From<FrameRecord> for LandmarkFrame {
    fn from(record: FrameRecord) -> Self {
        let hands = record
            .hands
            .into_iter()
            .map(|hand| {
                let points = hand
                    .landmarks
                    .iter()
                    .map(|coords| Point {
                        x: coords.first().copied().unwrap_or(f64::NAN),
                        y: coords.get(1).copied().unwrap_or(f64::NAN),
                        z: coords.get(2).copied().unwrap_or(0.0),
                    })
                    .collect();
                let handedness = hand.label.map(|label| Handedness {
                    label,
                    score: hand.score,
                });
                LandmarkSet::new(points, handedness)
            })
            .collect();
        LandmarkFrame::new(record.t, hands)
    }
}

// ── Test helpers ───────────────────────────────────────────

/// A well-formed hand with every landmark at `(x, y)`.
#[cfg(test)]
pub(crate) fn make_hand(x: f64, y: f64, handedness: Option<Handedness>) -> LandmarkSet {
    LandmarkSet::new(vec![Point::new(x, y); LANDMARK_COUNT], handedness)
}

#[cfg(test)]
pub(crate) fn set_point(hand: &mut LandmarkSet, landmark: Landmark, x: f64, y: f64) {
    hand.points[landmark.index()] = Point::new(x, y);
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_indices() {
        assert_eq!(Landmark::Wrist.index(), 0);
        assert_eq!(Landmark::ThumbIp.index(), 3);
        assert_eq!(Landmark::ThumbTip.index(), 4);
        assert_eq!(Landmark::IndexTip.index(), 8);
        assert_eq!(Landmark::RingTip.index(), 16);
        assert_eq!(Landmark::PinkyTip.index(), LANDMARK_COUNT - 1);
    }

    #[test]
    fn test_mirrored_label() {
        assert_eq!(HandLabel::Left.mirrored(), HandLabel::Right);
        assert_eq!(HandLabel::Right.mirrored(), HandLabel::Left);
    }

    #[test]
    fn test_well_formed() {
        let hand = make_hand(0.5, 0.5, None);
        assert!(hand.is_well_formed());

        let short = LandmarkSet::new(vec![Point::new(0.5, 0.5); 20], None);
        assert!(!short.is_well_formed());

        let mut nan = make_hand(0.5, 0.5, None);
        nan.points[3].y = f64::NAN;
        assert!(!nan.is_well_formed());
    }

    #[test]
    fn test_point_geometry() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.3, 0.4);
        assert!((a.distance_2d(&b) - 0.5).abs() < 1e-12);
        let m = a.midpoint(&b);
        assert!((m.x - 0.15).abs() < 1e-12);
        assert!((m.y - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_frame_record_conversion() {
        let mut landmarks = vec![vec![0.1, 0.2, 0.3]; LANDMARK_COUNT];
        landmarks[0] = vec![0.4, 0.5];
        let json = serde_json::json!({
            "t": 1.5,
            "hands": [{ "landmarks": landmarks, "label": "Left", "score": 0.8 }]
        });
        let record: FrameRecord = serde_json::from_value(json).unwrap();
        let frame = LandmarkFrame::from(record);

        assert_eq!(frame.timestamp_s, 1.5);
        assert_eq!(frame.hands.len(), 1);
        let hand = &frame.hands[0];
        assert!(hand.is_well_formed());
        assert_eq!(hand.point(Landmark::Wrist), Some(Point::new(0.4, 0.5)));
        let handedness = hand.handedness.unwrap();
        assert_eq!(handedness.label, HandLabel::Left);
        assert_eq!(handedness.score, 0.8);
    }

    #[test]
    fn test_frame_record_without_hands() {
        let record: FrameRecord = serde_json::from_str(r#"{"t": 2.0}"#).unwrap();
        let frame = LandmarkFrame::from(record);
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn test_frame_record_short_coordinate_is_malformed() {
        let mut landmarks = vec![vec![0.1, 0.2]; LANDMARK_COUNT];
        landmarks[5] = vec![0.1];
        let json = serde_json::json!({ "t": 0.0, "hands": [{ "landmarks": landmarks }] });
        let record: FrameRecord = serde_json::from_value(json).unwrap();
        let frame = LandmarkFrame::from(record);
        assert!(!frame.hands[0].is_well_formed());
        assert!(frame.hands[0].handedness.is_none());
    }
}
