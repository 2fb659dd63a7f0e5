//! Embassy async tasks

pub mod cycle;

pub use cycle::{cycle_task, Rtc, Stepper};
