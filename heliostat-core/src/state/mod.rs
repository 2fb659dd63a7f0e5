//! Cycle state machine
//!
//! Explicit, finite, and deterministic. Only the cycle controller owns
//! and advances it, once per poll tick.

pub mod events;
pub mod machine;

pub use events::Trigger;
pub use machine::CycleState;
