//! Monthly sunrise/sunset table
//!
//! Twelve entries at minute-of-day resolution. There is no interpolation
//! between months: the month boundary is a hard step change.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::ConfigError;
use crate::error::CycleError;
use crate::traits::clock::MINUTES_PER_DAY;

/// Number of entries in a daylight table
pub const MONTHS: usize = 12;

/// Default sunrise per month, minutes since midnight (temperate latitude)
pub const DEFAULT_SUNRISE: [u16; MONTHS] = [450, 420, 375, 345, 315, 300, 330, 360, 390, 420, 435, 450];

/// Default sunset per month, minutes since midnight
pub const DEFAULT_SUNSET: [u16; MONTHS] =
    [990, 1035, 1095, 1140, 1185, 1200, 1200, 1155, 1110, 1065, 1005, 990];

/// Half-open daylight interval `[sunrise, sunset)` in minutes of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaylightWindow {
    /// First minute with daylight
    pub sunrise: u16,
    /// First minute of night
    pub sunset: u16,
}

impl DaylightWindow {
    /// Check if a minute of day falls in daylight
    ///
    /// Sunrise is inclusive, sunset exclusive.
    pub fn contains(&self, minute_of_day: u16) -> bool {
        minute_of_day >= self.sunrise && minute_of_day < self.sunset
    }

    /// Check if a minute of day is at or after sunset
    pub fn is_after_sunset(&self, minute_of_day: u16) -> bool {
        minute_of_day >= self.sunset
    }

    /// Length of daylight in minutes
    pub fn length_minutes(&self) -> u16 {
        self.sunset.saturating_sub(self.sunrise)
    }
}

/// One month of the daylight table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DaylightEntry {
    /// Month, 1-12
    pub month: u8,
    /// Sunrise, minutes since midnight
    pub sunrise_minute: u16,
    /// Sunset, minutes since midnight
    pub sunset_minute: u16,
}

impl DaylightEntry {
    /// Daylight window for this month
    pub fn window(&self) -> DaylightWindow {
        DaylightWindow {
            sunrise: self.sunrise_minute,
            sunset: self.sunset_minute,
        }
    }

    fn is_valid(&self) -> bool {
        self.sunrise_minute < self.sunset_minute && self.sunset_minute < MINUTES_PER_DAY
    }
}

/// Validated twelve-month daylight table
///
/// Every entry satisfies `sunrise < sunset <= 1439`; construction
/// rejects anything else, so lookups never see polar day or night.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DaylightTable {
    entries: [DaylightEntry; MONTHS],
}

impl Default for DaylightTable {
    fn default() -> Self {
        Self::temperate()
    }
}

impl DaylightTable {
    /// Built-in temperate-latitude table
    pub const fn temperate() -> Self {
        let mut entries = [DaylightEntry {
            month: 0,
            sunrise_minute: 0,
            sunset_minute: 0,
        }; MONTHS];

        let mut i = 0;
        while i < MONTHS {
            entries[i] = DaylightEntry {
                month: i as u8 + 1,
                sunrise_minute: DEFAULT_SUNRISE[i],
                sunset_minute: DEFAULT_SUNSET[i],
            };
            i += 1;
        }

        Self { entries }
    }

    /// Build a table from per-month sunrise and sunset minutes
    ///
    /// Index 0 is January.
    pub fn from_minutes(
        sunrise: &[u16; MONTHS],
        sunset: &[u16; MONTHS],
    ) -> Result<Self, ConfigError> {
        let mut table = Self::temperate();

        for (i, entry) in table.entries.iter_mut().enumerate() {
            *entry = DaylightEntry {
                month: i as u8 + 1,
                sunrise_minute: sunrise[i],
                sunset_minute: sunset[i],
            };
            if !entry.is_valid() {
                return Err(ConfigError::InvalidDaylight { month: entry.month });
            }
        }

        Ok(table)
    }

    /// Look up the daylight window for a month (1-12)
    pub fn lookup(&self, month: u8) -> Result<DaylightWindow, CycleError> {
        if !(1..=MONTHS as u8).contains(&month) {
            return Err(CycleError::InvalidMonth(month));
        }
        Ok(self.entries[(month - 1) as usize].window())
    }

    /// All entries, January first
    pub fn entries(&self) -> &[DaylightEntry; MONTHS] {
        &self.entries
    }
}
