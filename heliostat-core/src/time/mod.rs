//! Time mapping
//!
//! Converts wall time into minute-of-day under real-time or
//! compressed-simulation mode.

pub mod mapper;

pub use mapper::{SimulationClock, TimeMapper};
