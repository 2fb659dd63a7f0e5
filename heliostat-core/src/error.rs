//! Controller error types

use crate::traits::ClockError;

/// Errors surfaced by the cycle controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError {
    /// Clock source failed to initialize; no time source exists
    ClockUnavailable,
    /// A single clock read failed; the tick is skipped
    ClockRead(ClockError),
    /// Month outside 1..=12 reached the daylight table
    InvalidMonth(u8),
}

impl CycleError {
    /// Check if this error halts all control activity
    pub fn is_fatal(&self) -> bool {
        matches!(self, CycleError::ClockUnavailable)
    }
}

impl From<ClockError> for CycleError {
    fn from(e: ClockError) -> Self {
        CycleError::ClockRead(e)
    }
}
