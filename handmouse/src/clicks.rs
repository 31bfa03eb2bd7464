//! Click gestures on the click hand.
//!
//! Two independent edge-triggered machines:
//! - left hold: index-thumb pinch presses the left button, letting go
//!   releases it (drag support);
//! - right click: middle-thumb pinch fires one right click per pinch.

use tracing::debug;

use crate::config::GestureSet;
use crate::driver::{MouseButton, PointerCommand};
use crate::fingers::{Finger, FingerState};

/// Persistent click state across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickState {
    /// The engine currently holds the OS left button down.
    pub left_held: bool,
    /// Index pinch as observed last frame.
    pub left_pinch_prev: bool,
    /// A right click fired and the middle pinch has not been let go yet.
    pub right_armed: bool,
}

/// Left-hold and right-click state machines.
#[derive(Debug, Default)]
pub struct ClickMachine {
    state: ClickState,
}

impl ClickMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ClickState {
        &self.state
    }

    /// Advance with the click hand's finger state for this frame.
    pub fn update(&mut self, fingers: &FingerState, gestures: &GestureSet) -> Vec<PointerCommand> {
        let mut commands = Vec::new();

        let left_pinch = fingers.pinched(Finger::Index);
        if gestures.left_hold {
            if left_pinch && !self.state.left_pinch_prev && !self.state.left_held {
                self.state.left_held = true;
                debug!("Click: left press");
                commands.push(PointerCommand::Press(MouseButton::Left));
            } else if !left_pinch {
                commands.extend(self.release_hold());
            }
        } else {
            commands.extend(self.release_hold());
        }
        self.state.left_pinch_prev = left_pinch;

        let right_pinch = fingers.pinched(Finger::Middle);
        if gestures.right_click && right_pinch && !self.state.right_armed {
            debug!("Click: right click");
            commands.push(PointerCommand::Click(MouseButton::Right));
        }
        self.state.right_armed = right_pinch;

        commands
    }

    /// Release the left button if held. Idempotent.
    pub fn release_hold(&mut self) -> Option<PointerCommand> {
        if !self.state.left_held {
            return None;
        }
        self.state.left_held = false;
        debug!("Click: left release");
        Some(PointerCommand::Release(MouseButton::Left))
    }

    /// Mark the left button held again after its release was refused.
    pub fn restore_hold(&mut self) {
        debug!("Click: left release refused, still held");
        self.state.left_held = true;
    }

    /// Click hand gone: release anything held and return to idle.
    pub fn on_hand_lost(&mut self) -> Vec<PointerCommand> {
        let commands: Vec<PointerCommand> = self.release_hold().into_iter().collect();
        self.state = ClickState::default();
        commands
    }

    /// S-expression for status output.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:left-held {} :right-armed {})",
            if self.state.left_held { "t" } else { "nil" },
            if self.state.right_armed { "t" } else { "nil" },
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
