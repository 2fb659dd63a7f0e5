//! Real-time clock trait
//!
//! This trait abstracts over battery-backed RTC peripherals
//! (DS3231, DS1307, PCF8523, etc.)

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minutes in one day
pub const MINUTES_PER_DAY: u16 = 1440;

/// Calendar date and wall time, as read from an RTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateTime {
    /// Full year (e.g. 2025)
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of month, 1-31
    pub day: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59
    pub second: u8,
}

impl DateTime {
    /// Create a new date/time
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Minutes elapsed since local midnight, clamped to 0-1439
    pub fn minute_of_day(&self) -> u16 {
        let minutes = self.hour as u16 * 60 + self.minute as u16;
        minutes.min(MINUTES_PER_DAY - 1)
    }

    /// Check if two readings fall on the same calendar date
    pub fn same_date(&self, other: &DateTime) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }

    /// Check that every field is within its calendar range
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }
}

/// Errors that can occur reading or configuring the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Peripheral did not respond (absent or unpowered)
    NotPresent,
    /// Bus transfer failed after the peripheral was found
    Bus,
    /// Peripheral returned out-of-range register contents
    InvalidData,
}

/// Trait for wall-clock time sources
pub trait ClockSource {
    /// Initialize the peripheral
    ///
    /// Fails with [`ClockError::NotPresent`] when nothing answers.
    fn begin(&mut self) -> Result<(), ClockError>;

    /// Read the current date and time
    fn now(&mut self) -> Result<DateTime, ClockError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_of_day() {
        assert_eq!(DateTime::new(2025, 1, 1, 0, 0, 0).minute_of_day(), 0);
        assert_eq!(DateTime::new(2025, 1, 1, 7, 30, 0).minute_of_day(), 450);
        assert_eq!(DateTime::new(2025, 1, 1, 23, 59, 59).minute_of_day(), 1439);
    }

    #[test]
    fn test_minute_of_day_clamps_garbage() {
        // Corrupt hour register must not escape the day range
        assert_eq!(DateTime::new(2025, 1, 1, 30, 0, 0).minute_of_day(), 1439);
    }

    #[test]
    fn test_same_date() {
        let a = DateTime::new(2025, 6, 21, 23, 59, 0);
        let b = DateTime::new(2025, 6, 21, 0, 1, 0);
        let c = DateTime::new(2025, 6, 22, 0, 0, 0);
        assert!(a.same_date(&b));
        assert!(!a.same_date(&c));
    }

    #[test]
    fn test_validity() {
        assert!(DateTime::new(2025, 12, 31, 23, 59, 59).is_valid());
        assert!(!DateTime::new(2025, 13, 1, 0, 0, 0).is_valid());
        assert!(!DateTime::new(2025, 0, 1, 0, 0, 0).is_valid());
        assert!(!DateTime::new(2025, 1, 1, 24, 0, 0).is_valid());
    }
}
