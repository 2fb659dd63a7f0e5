//! State machine triggers

/// Triggers that drive cycle state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Planner emitted a move request
    MovePlanned,
    /// Driver reports the commanded move finished
    MoveComplete,
    /// Day boundary (or configured sunset) reached
    DayEnded,
    /// Actuator is back at position 0
    HomeReached,
}
