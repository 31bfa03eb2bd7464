//! Per-hand finger extension and pinch classification.
//!
//! Extension is a vertical comparison between a fingertip and a lower joint
//! of the same finger: smaller y is higher in the image, so a tip above its
//! knuckle counts as "up". This assumes a roughly upright hand and is an
//! approximation; a rotated hand can read as curled.

use tracing::debug;

use crate::landmarks::{Landmark, LandmarkSet, Point};

/// The four non-thumb fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// Fingertip landmark.
    pub fn tip(&self) -> Landmark {
        match self {
            Self::Index => Landmark::IndexTip,
            Self::Middle => Landmark::MiddleTip,
            Self::Ring => Landmark::RingTip,
            Self::Pinky => Landmark::PinkyTip,
        }
    }

    /// Knuckle the tip is compared against for extension.
    pub fn knuckle(&self) -> Landmark {
        match self {
            Self::Index => Landmark::IndexMcp,
            Self::Middle => Landmark::MiddleMcp,
            Self::Ring => Landmark::RingMcp,
            Self::Pinky => Landmark::PinkyMcp,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }
}

/// Up/down reading of one digit. Both false when tip and joint are level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extension {
    pub up: bool,
    pub down: bool,
}

impl Extension {
    fn compare(tip: Point, joint: Point) -> Self {
        Self {
            up: tip.y < joint.y,
            down: tip.y > joint.y,
        }
    }
}

/// Finger state of one hand for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    /// Index, middle, ring, pinky.
    fingers: [Extension; 4],
    /// Thumb tip against its interphalangeal joint.
    pub thumb: Extension,
    /// Fingertip within the pinch threshold of the thumb tip.
    pinches: [bool; 4],
    /// All four fingers up.
    pub all_up: bool,
    /// All four fingers down.
    pub all_down: bool,
}

impl FingerState {
    /// Classify a landmark set. A malformed set yields the all-false default.
    pub fn classify(hand: &LandmarkSet, pinch_threshold: f64) -> Self {
        if !hand.is_well_formed() {
            debug!(
                "Finger state: malformed hand ({} points), skipping",
                hand.points.len()
            );
            return Self::default();
        }
        let at = |landmark: Landmark| hand.points[landmark.index()];

        let thumb_tip = at(Landmark::ThumbTip);
        let mut state = Self {
            thumb: Extension::compare(thumb_tip, at(Landmark::ThumbIp)),
            ..Self::default()
        };

        for finger in Finger::ALL {
            let tip = at(finger.tip());
            state.fingers[finger.slot()] = Extension::compare(tip, at(finger.knuckle()));
            state.pinches[finger.slot()] = tip.distance_2d(&thumb_tip) < pinch_threshold;
        }

        state.all_up = state.fingers.iter().all(|f| f.up);
        state.all_down = state.fingers.iter().all(|f| f.down);
        state
    }

    pub fn finger(&self, finger: Finger) -> Extension {
        self.fingers[finger.slot()]
    }

    /// Whether `finger`'s tip is pinched against the thumb tip.
    pub fn pinched(&self, finger: Finger) -> bool {
        self.pinches[finger.slot()]
    }

    /// Freeze pose: all four fingers up with the thumb tucked down.
    pub fn is_frozen(&self) -> bool {
        self.all_up && self.thumb.down
    }

    /// Compact s-expression for status output.
    pub fn status_sexp(&self) -> String {
        let flag = |b: bool| if b { "t" } else { "nil" };
        let up: Vec<&str> = Finger::ALL
            .iter()
            .filter(|f| self.finger(**f).up)
            .map(|f| f.as_str())
            .collect();
        let pinched: Vec<&str> = Finger::ALL
            .iter()
            .filter(|f| self.pinched(**f))
            .map(|f| f.as_str())
            .collect();
        format!(
            "(:up ({}) :pinch ({}) :thumb-down {} :frozen {})",
            up.join(" "),
            pinched.join(" "),
            flag(self.thumb.down),
            flag(self.is_frozen()),
        )
    }
}

// ── Test helpers ───────────────────────────────────────────

/// An upright open hand: every fingertip well above its knuckle, thumb up,
/// nothing pinched.
#[cfg(test)]
pub(crate) fn make_open_hand() -> LandmarkSet {
    use crate::landmarks::{make_hand, set_point};

    let mut hand = make_hand(0.5, 0.8, None);
    set_point(&mut hand, Landmark::ThumbIp, 0.35, 0.65);
    set_point(&mut hand, Landmark::ThumbTip, 0.30, 0.60);
    for (i, finger) in Finger::ALL.iter().enumerate() {
        let x = 0.42 + 0.06 * i as f64;
        set_point(&mut hand, finger.knuckle(), x, 0.6);
        set_point(&mut hand, finger.tip(), x, 0.35);
    }
    hand
}

/// Bend the thumb so its tip sits below its IP joint.
#[cfg(test)]
pub(crate) fn tuck_thumb(hand: &mut LandmarkSet) {
    use crate::landmarks::set_point;
    set_point(hand, Landmark::ThumbTip, 0.38, 0.72);
}

/// Put `finger`'s tip right next to the thumb tip.
#[cfg(test)]
pub(crate) fn pinch(hand: &mut LandmarkSet, finger: Finger) {
    use crate::landmarks::set_point;
    let thumb = hand.points[Landmark::ThumbTip.index()];
    set_point(hand, finger.tip(), thumb.x + 0.01, thumb.y);
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{make_hand, set_point, Point};

    const THRESHOLD: f64 = 0.05;

    #[test]
    fn test_open_hand_all_up() {
        let state = FingerState::classify(&make_open_hand(), THRESHOLD);
        for finger in Finger::ALL {
            assert!(state.finger(finger).up, "{} should be up", finger.as_str());
            assert!(!state.finger(finger).down);
            assert!(!state.pinched(finger));
        }
        assert!(state.all_up);
        assert!(!state.all_down);
        assert!(state.thumb.up);
        assert!(!state.is_frozen());
    }

    #[test]
    fn test_fist_all_down() {
        let mut hand = make_open_hand();
        for finger in Finger::ALL {
            let knuckle = hand.points[finger.knuckle().index()];
            set_point(&mut hand, finger.tip(), knuckle.x, knuckle.y + 0.1);
        }
        let state = FingerState::classify(&hand, THRESHOLD);
        assert!(state.all_down);
        assert!(!state.all_up);
    }

    #[test]
    fn test_level_tip_is_neither_up_nor_down() {
        let hand = make_hand(0.5, 0.5, None);
        let state = FingerState::classify(&hand, THRESHOLD);
        let index = state.finger(Finger::Index);
        assert!(!index.up);
        assert!(!index.down);
        assert!(!state.all_up);
        assert!(!state.all_down);
    }

    #[test]
    fn test_freeze_pose() {
        let mut hand = make_open_hand();
        tuck_thumb(&mut hand);
        let state = FingerState::classify(&hand, THRESHOLD);
        assert!(state.thumb.down);
        assert!(state.is_frozen());
    }

    #[test]
    fn test_pinch_strictly_below_threshold() {
        let mut hand = make_open_hand();
        set_point(&mut hand, Landmark::ThumbTip, 0.30, 0.60);

        set_point(&mut hand, Landmark::IndexTip, 0.30 + 0.049, 0.60);
        assert!(FingerState::classify(&hand, THRESHOLD).pinched(Finger::Index));

        // Exactly on the threshold is not a pinch (binary-exact values).
        set_point(&mut hand, Landmark::ThumbTip, 0.25, 0.5);
        set_point(&mut hand, Landmark::IndexTip, 0.3125, 0.5);
        assert!(!FingerState::classify(&hand, 0.0625).pinched(Finger::Index));
        set_point(&mut hand, Landmark::ThumbTip, 0.30, 0.60);

        set_point(&mut hand, Landmark::IndexTip, 0.30 + 0.051, 0.60);
        assert!(!FingerState::classify(&hand, THRESHOLD).pinched(Finger::Index));
    }

    #[test]
    fn test_pinch_each_finger() {
        for finger in Finger::ALL {
            let mut hand = make_open_hand();
            pinch(&mut hand, finger);
            let state = FingerState::classify(&hand, THRESHOLD);
            for other in Finger::ALL {
                assert_eq!(state.pinched(other), other == finger);
            }
        }
    }

    #[test]
    fn test_pinch_ignores_depth() {
        let mut hand = make_open_hand();
        pinch(&mut hand, Finger::Middle);
        hand.points[Landmark::MiddleTip.index()].z = 0.5;
        let state = FingerState::classify(&hand, THRESHOLD);
        assert!(state.pinched(Finger::Middle));
    }

    #[test]
    fn test_malformed_hand_is_empty_state() {
        let hand = LandmarkSet::new(vec![Point::new(0.5, 0.5); 5], None);
        assert_eq!(FingerState::classify(&hand, THRESHOLD), FingerState::default());
    }

    #[test]
    fn test_status_sexp() {
        let mut hand = make_open_hand();
        pinch(&mut hand, Finger::Index);
        let sexp = FingerState::classify(&hand, THRESHOLD).status_sexp();
        assert!(sexp.contains(":pinch (index)"));
        assert!(sexp.contains(":frozen nil"));
    }
}
