//! Safety monitoring
//!
//! Keeps the actuator windings unpowered whenever the actuator is not
//! being driven.

pub mod guard;

pub use guard::{CoilGuard, GuardStatus};
