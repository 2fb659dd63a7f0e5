//! Motion planning
//!
//! Decides when the actuator advances and how far.

pub mod planner;

pub use planner::{HoldReason, MoveRequest, PlanDecision, PlanInput, PositionPlanner};
