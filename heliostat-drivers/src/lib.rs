//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in heliostat-core, written against the embedded-hal 1.0 traits:
//!
//! - Real-time clock (DS3231 over I2C)
//! - Stepper driver (28BYJ-48 half-step over four GPIO coil outputs)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod rtc;
pub mod stepper;
