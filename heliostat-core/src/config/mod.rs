//! Configuration types
//!
//! Board-agnostic configuration structures. Values are fixed at build or
//! startup time and never change while the controller runs.

pub mod daylight;
pub mod types;

pub use daylight::*;
pub use types::*;
