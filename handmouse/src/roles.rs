//! Assigns detected hands to the movement and click roles.
//!
//! The estimator labels hands as they appear in the mirrored preview, so a
//! reported "Left" is the user's right hand. The user's right hand drives the
//! cursor and the left hand clicks, unless the roles are inverted.

use tracing::trace;

use crate::landmarks::{HandLabel, LandmarkSet};

/// Role a hand plays for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Movement,
    Click,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::Click => "click",
        }
    }
}

/// Which hand, if any, plays each role this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandRoles<'a> {
    pub movement: Option<&'a LandmarkSet>,
    pub click: Option<&'a LandmarkSet>,
}

impl<'a> HandRoles<'a> {
    fn swapped(self) -> Self {
        Self {
            movement: self.click,
            click: self.movement,
        }
    }
}

/// Role for a hand the user considers `user_label`, before inversion.
fn role_for(user_label: HandLabel) -> Role {
    match user_label {
        HandLabel::Right => Role::Movement,
        HandLabel::Left => Role::Click,
    }
}

/// The user's-perspective label of a hand, if its handedness is trustworthy.
fn reliable_label(hand: &LandmarkSet, min_confidence: f64) -> Option<HandLabel> {
    hand.handedness
        .filter(|h| h.score >= min_confidence)
        .map(|h| h.label.mirrored())
}

/// Resolve roles for up to two hands. Extra hands beyond the first two are ignored.
pub fn resolve_roles(hands: &[LandmarkSet], invert: bool, min_confidence: f64) -> HandRoles<'_> {
    let roles = match hands {
        [] => return HandRoles::default(),
        [hand] => match reliable_label(hand, min_confidence) {
            Some(label) => match role_for(label) {
                Role::Movement => HandRoles {
                    movement: Some(hand),
                    click: None,
                },
                Role::Click => HandRoles {
                    movement: None,
                    click: Some(hand),
                },
            },
            // An unlabeled lone hand always moves the cursor, inverted or not.
            None => {
                return HandRoles {
                    movement: Some(hand),
                    click: None,
                }
            }
        },
        [first, second, ..] => {
            let labels = (
                reliable_label(first, min_confidence),
                reliable_label(second, min_confidence),
            );
            match labels {
                (Some(a), Some(b)) if a != b => {
                    if role_for(a) == Role::Movement {
                        HandRoles {
                            movement: Some(first),
                            click: Some(second),
                        }
                    } else {
                        HandRoles {
                            movement: Some(second),
                            click: Some(first),
                        }
                    }
                }
                // Both classified as the same hand: first seen moves.
                (Some(_), Some(_)) => HandRoles {
                    movement: Some(first),
                    click: Some(second),
                },
                _ => by_wrist_position(first, second),
            }
        }
    };

    let describe = |hand: Option<&LandmarkSet>| match hand {
        Some(h) => h.handedness.map_or("unlabeled", |hd| hd.label.as_str()),
        None => "none",
    };
    trace!(
        "Roles: {}={} {}={} invert={}",
        Role::Movement.as_str(),
        describe(roles.movement),
        Role::Click.as_str(),
        describe(roles.click),
        invert
    );
    if invert {
        roles.swapped()
    } else {
        roles
    }
}

/// Fallback for unlabeled pairs: the rightmost wrist in the mirrored frame
/// belongs to the user's right hand.
fn by_wrist_position<'a>(first: &'a LandmarkSet, second: &'a LandmarkSet) -> HandRoles<'a> {
    let first_x = first.wrist_x().unwrap_or(f64::NEG_INFINITY);
    let second_x = second.wrist_x().unwrap_or(f64::NEG_INFINITY);
    if second_x > first_x {
        HandRoles {
            movement: Some(second),
            click: Some(first),
        }
    } else {
        HandRoles {
            movement: Some(first),
            click: Some(second),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{make_hand, Handedness};

    const MIN_CONF: f64 = 0.5;

    fn labeled(x: f64, label: HandLabel, score: f64) -> LandmarkSet {
        make_hand(x, 0.5, Some(Handedness { label, score }))
    }

    fn is(role: Option<&LandmarkSet>, hand: &LandmarkSet) -> bool {
        role.map_or(false, |r| std::ptr::eq(r, hand))
    }

    #[test]
    fn test_no_hands() {
        let roles = resolve_roles(&[], false, MIN_CONF);
        assert!(roles.movement.is_none());
        assert!(roles.click.is_none());
    }

    #[test]
    fn test_single_labeled_hand_is_mirrored() {
        // Estimator "Left" is the user's right hand: movement.
        let hands = [labeled(0.5, HandLabel::Left, 0.9)];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(is(roles.movement, &hands[0]));
        assert!(roles.click.is_none());

        // Estimator "Right" is the user's left hand: click.
        let hands = [labeled(0.5, HandLabel::Right, 0.9)];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(roles.movement.is_none());
        assert!(is(roles.click, &hands[0]));
    }

    #[test]
    fn test_single_labeled_hand_inverted() {
        let hands = [labeled(0.5, HandLabel::Left, 0.9)];
        let roles = resolve_roles(&hands, true, MIN_CONF);
        assert!(roles.movement.is_none());
        assert!(is(roles.click, &hands[0]));
    }

    #[test]
    fn test_single_unlabeled_hand_always_moves() {
        let hands = [make_hand(0.5, 0.5, None)];
        for invert in [false, true] {
            let roles = resolve_roles(&hands, invert, MIN_CONF);
            assert!(is(roles.movement, &hands[0]));
            assert!(roles.click.is_none());
        }
    }

    #[test]
    fn test_low_confidence_label_is_ignored() {
        let hands = [labeled(0.5, HandLabel::Right, 0.2)];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(is(roles.movement, &hands[0]));
    }

    #[test]
    fn test_two_labeled_hands() {
        let hands = [
            labeled(0.2, HandLabel::Right, 0.9),
            labeled(0.8, HandLabel::Left, 0.9),
        ];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(is(roles.movement, &hands[1]));
        assert!(is(roles.click, &hands[0]));

        let roles = resolve_roles(&hands, true, MIN_CONF);
        assert!(is(roles.movement, &hands[0]));
        assert!(is(roles.click, &hands[1]));
    }

    #[test]
    fn test_two_hands_same_label_first_moves() {
        let hands = [
            labeled(0.2, HandLabel::Right, 0.9),
            labeled(0.8, HandLabel::Right, 0.9),
        ];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(is(roles.movement, &hands[0]));
        assert!(is(roles.click, &hands[1]));
    }

    #[test]
    fn test_two_unlabeled_hands_by_wrist() {
        let hands = [make_hand(0.3, 0.5, None), make_hand(0.7, 0.5, None)];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(is(roles.movement, &hands[1]));
        assert!(is(roles.click, &hands[0]));

        let roles = resolve_roles(&hands, true, MIN_CONF);
        assert!(is(roles.movement, &hands[0]));
        assert!(is(roles.click, &hands[1]));
    }

    #[test]
    fn test_one_label_missing_uses_wrist_heuristic() {
        let hands = [
            make_hand(0.9, 0.5, None),
            labeled(0.1, HandLabel::Left, 0.9),
        ];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(is(roles.movement, &hands[0]));
        assert!(is(roles.click, &hands[1]));
    }

    #[test]
    fn test_third_hand_ignored() {
        let hands = [
            make_hand(0.1, 0.5, None),
            make_hand(0.2, 0.5, None),
            make_hand(0.9, 0.5, None),
        ];
        let roles = resolve_roles(&hands, false, MIN_CONF);
        assert!(is(roles.movement, &hands[1]));
        assert!(is(roles.click, &hands[0]));
    }
}
