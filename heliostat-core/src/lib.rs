//! Board-agnostic core logic for the heliostat firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (clock source, actuator driver, coil outputs)
//! - Monthly daylight table and cycle configuration
//! - Time mapping for real-time and compressed-simulation modes
//! - Position planning within the daylight window
//! - Coil-safety guard
//! - Cycle state machine and the controller that drives it

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod motion;
pub mod safety;
pub mod state;
pub mod time;
pub mod traits;

pub use controller::{CycleController, CycleEvent, HoldReason, ResetReason};
pub use error::CycleError;
