//! Stepper driver implementations

pub mod half_step;

pub use half_step::{HalfStepStepper, HALF_STEP_SEQUENCE};
