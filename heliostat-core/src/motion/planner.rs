//! Position planner for the daily sweep
//!
//! The travel range is split into a fixed number of slots. During
//! daylight the actuator advances one slot at a time, never faster than
//! the minimum inter-move interval and never past the end of travel.

use crate::config::{CycleConfig, DaylightWindow};

/// Target handed from the planner to the actuator driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveRequest {
    /// Absolute target position in steps
    pub target_position: i32,
    /// Coils may only be released once the move has finished
    pub must_complete_before_safety: bool,
}

impl MoveRequest {
    /// Advance to an absolute position
    pub const fn advance(target_position: i32) -> Self {
        Self {
            target_position,
            must_complete_before_safety: true,
        }
    }

    /// Return to home (position 0)
    pub const fn home() -> Self {
        Self {
            target_position: 0,
            must_complete_before_safety: true,
        }
    }
}

/// Why no move is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldReason {
    /// Before sunrise or at/after sunset
    OutsideDaylight,
    /// Next slot would overshoot the travel range, or all slots are used
    TravelExhausted,
    /// Previous move was too recent
    RateLimited,
}

/// Planner output for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanDecision {
    /// Advance now
    Move(MoveRequest),
    /// Stay where we are
    Hold(HoldReason),
}

/// Snapshot of everything the planner looks at
#[derive(Debug, Clone, Copy)]
pub struct PlanInput {
    /// Current minute of day (0-1439)
    pub minute_of_day: u16,
    /// Daylight window for the current month
    pub window: DaylightWindow,
    /// Current actuator position in steps
    pub position: i32,
    /// Moves completed since the last reset
    pub moves_today: u16,
    /// Monotonic time now
    pub now_ms: u64,
    /// Monotonic time of the previous move, if any
    pub last_move_ms: Option<u64>,
}

/// Position planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionPlanner {
    max_travel_steps: i32,
    steps_per_move: i32,
    slots_per_day: u16,
    min_move_interval_ms: u32,
}

impl PositionPlanner {
    /// Create a planner from the cycle configuration
    pub fn new(config: &CycleConfig) -> Self {
        Self {
            max_travel_steps: config.max_travel_steps,
            steps_per_move: config.steps_per_move(),
            slots_per_day: config.slots_per_day,
            min_move_interval_ms: config.min_move_interval_ms,
        }
    }

    /// Upper bound on position
    pub fn max_travel_steps(&self) -> i32 {
        self.max_travel_steps
    }

    /// Steps per move
    pub fn steps_per_move(&self) -> i32 {
        self.steps_per_move
    }

    /// Decide whether a move is due
    pub fn plan(&self, input: &PlanInput) -> PlanDecision {
        if !input.window.contains(input.minute_of_day) {
            return PlanDecision::Hold(HoldReason::OutsideDaylight);
        }

        let target = input.position.saturating_add(self.steps_per_move);
        if self.steps_per_move <= 0
            || target > self.max_travel_steps
            || input.moves_today >= self.slots_per_day
        {
            return PlanDecision::Hold(HoldReason::TravelExhausted);
        }

        if let Some(last) = input.last_move_ms {
            if input.now_ms.saturating_sub(last) < self.min_move_interval_ms as u64 {
                return PlanDecision::Hold(HoldReason::RateLimited);
            }
        }

        PlanDecision::Move(MoveRequest::advance(target))
    }
}
