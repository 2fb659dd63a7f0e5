//! Hardware abstraction traits
//!
//! These traits define the interface between the day-cycle logic
//! and hardware-specific implementations.

pub mod actuator;
pub mod clock;

pub use actuator::{ActuatorDriver, CoilOutputs};
pub use clock::{ClockError, ClockSource, DateTime};
