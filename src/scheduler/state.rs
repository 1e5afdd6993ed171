// src/scheduler/state.rs
// Rotation states, timers and user interactions

use std::fmt;
use std::time::Duration;

/// Where the rotation currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// Catalog loaded (or not), no widget chosen yet
    Idle,
    /// Picking the next eligible widget
    Selecting,
    /// A widget is mounted; `expanded` only matters for floating buttons
    Visible { index: usize, expanded: bool },
    /// Between a hide and the next selection
    HiddenCooldown,
    /// Every widget reached its loop limit; terminal
    Exhausted,
}

impl fmt::Display for RotationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationState::Idle => write!(f, "idle"),
            RotationState::Selecting => write!(f, "selecting"),
            RotationState::Visible { index, expanded: false } => write!(f, "visible[{}]", index),
            RotationState::Visible { index, expanded: true } => {
                write!(f, "visible[{}, expanded]", index)
            }
            RotationState::HiddenCooldown => write!(f, "cooldown"),
            RotationState::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Delay between catalog load and the first selection
    InitialDelay,
    /// `showTime` window of an auto-hiding widget
    AutoHide,
    /// `hideTime` window before the next selection
    Cooldown,
}

/// The scheduler's single outstanding timer.
/// Ids only grow, so a fired id that no longer matches is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: u64,
    pub kind: TimerKind,
    pub delay: Duration,
}

/// User actions observed on the mounted widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Close affordance clicked
    Dismiss,
    /// Modal overlay clicked
    OverlayClick,
    /// Call-to-action button clicked
    ButtonClick,
    /// Floating button trigger clicked
    ToggleFloating,
}

impl Interaction {
    /// Parse a CLI command word
    pub fn from_command(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "close" | "dismiss" => Some(Interaction::Dismiss),
            "overlay" => Some(Interaction::OverlayClick),
            "click" | "button" => Some(Interaction::ButtonClick),
            "toggle" | "bubble" => Some(Interaction::ToggleFloating),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_commands() {
        assert_eq!(Interaction::from_command("close"), Some(Interaction::Dismiss));
        assert_eq!(Interaction::from_command(" Toggle "), Some(Interaction::ToggleFloating));
        assert_eq!(Interaction::from_command("overlay"), Some(Interaction::OverlayClick));
        assert_eq!(Interaction::from_command("click"), Some(Interaction::ButtonClick));
        assert_eq!(Interaction::from_command("dance"), None);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RotationState::Visible { index: 2, expanded: false }.to_string(), "visible[2]");
        assert_eq!(RotationState::Exhausted.to_string(), "exhausted");
    }
}
