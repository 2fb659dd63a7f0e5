//! State machine definition

use super::events::Trigger;

/// Cycle controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    /// Waiting for the next move or day end
    #[default]
    Idle,
    /// A daylight move is in progress
    Advancing,
    /// Returning to home at day end
    Resetting,
}

impl CycleState {
    /// Check if the windings may be energized in this state
    pub fn coils_allowed(&self) -> bool {
        matches!(self, CycleState::Advancing | CycleState::Resetting)
    }

    /// Process a trigger and return the next state
    pub fn transition(self, trigger: Trigger) -> Self {
        use CycleState::*;
        use Trigger::*;

        match (self, trigger) {
            (Idle, MovePlanned) => Advancing,
            (Advancing, MoveComplete) => Idle,

            // Day end wins over an in-flight advance
            (Idle, DayEnded) | (Advancing, DayEnded) => Resetting,
            (Resetting, HomeReached) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(CycleState::default(), CycleState::Idle);
        assert!(!CycleState::Idle.coils_allowed());
    }

    #[test]
    fn test_advance_flow() {
        let advancing = CycleState::Idle.transition(Trigger::MovePlanned);
        assert_eq!(advancing, CycleState::Advancing);
        assert!(advancing.coils_allowed());

        let idle = advancing.transition(Trigger::MoveComplete);
        assert_eq!(idle, CycleState::Idle);
    }

    #[test]
    fn test_reset_from_any_active_state() {
        for state in [CycleState::Idle, CycleState::Advancing] {
            assert_eq!(state.transition(Trigger::DayEnded), CycleState::Resetting);
        }
        assert_eq!(
            CycleState::Resetting.transition(Trigger::HomeReached),
            CycleState::Idle
        );
    }

    #[test]
    fn test_resetting_ignores_moves() {
        let state = CycleState::Resetting;
        assert_eq!(state.transition(Trigger::MovePlanned), CycleState::Resetting);
        assert_eq!(state.transition(Trigger::DayEnded), CycleState::Resetting);
        assert!(state.coils_allowed());
    }

    #[test]
    fn test_unexpected_triggers_hold_state() {
        assert_eq!(
            CycleState::Idle.transition(Trigger::MoveComplete),
            CycleState::Idle
        );
        assert_eq!(
            CycleState::Idle.transition(Trigger::HomeReached),
            CycleState::Idle
        );
        assert_eq!(
            CycleState::Advancing.transition(Trigger::MovePlanned),
            CycleState::Advancing
        );
    }
}
