//! Cycle configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::daylight::DaylightTable;

/// Simulated day length used by the compressed preset (2.4 minutes)
pub const DEFAULT_DAY_DURATION_MS: u32 = 144_000;

/// Minimum spacing between moves in the compressed preset
pub const DEFAULT_MIN_MOVE_INTERVAL_MS: u32 = 1_500;

/// Movement slots across one day (15-minute granularity)
pub const DEFAULT_SLOTS_PER_DAY: u16 = 96;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Daylight entry with sunrise not before sunset, or past minute 1439
    InvalidDaylight { month: u8 },
    /// Compressed mode with a zero-length simulated day
    ZeroDayDuration,
    /// No movement slots configured
    ZeroSlots,
    /// Travel range smaller than one step per slot
    TravelTooShort,
}

/// How wall time maps onto the day cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeMode {
    /// Minute of day read straight from the wall clock
    Realtime,
    /// One simulated day every `day_duration_ms` of real time
    Compressed {
        /// Real milliseconds representing one simulated day
        day_duration_ms: u32,
    },
}

impl TimeMode {
    /// Check if this is the compressed simulation mode
    pub fn is_compressed(&self) -> bool {
        matches!(self, TimeMode::Compressed { .. })
    }
}

/// Stepper geometry and speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorConfig {
    /// Driver steps counted as one output-shaft revolution
    ///
    /// Only scales `max_travel_degrees` into steps. The default of 2048
    /// keeps the classic sweep length; a half-stepped 28BYJ-48 really
    /// takes 4096 steps per turn, so with the default a configured 180°
    /// moves the shaft a quarter turn. Set 4096 for true degrees.
    pub steps_per_revolution: u32,
    /// Travel from home to the end of the daily sweep, in degrees
    pub max_travel_degrees: u16,
    /// Speed ceiling in steps per second
    pub max_speed: u16,
    /// Constant stepping speed in steps per second
    pub speed: u16,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 2048,
            max_travel_degrees: 180,
            max_speed: 500,
            speed: 300,
        }
    }
}

impl ActuatorConfig {
    /// Steps from home to the end of travel
    pub fn travel_steps(&self) -> i32 {
        (self.steps_per_revolution as u64 * self.max_travel_degrees as u64 / 360) as i32
    }
}

/// Complete cycle configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CycleConfig {
    /// Real-time or compressed simulation
    pub time_mode: TimeMode,
    /// Stepper geometry and speed
    pub actuator: ActuatorConfig,
    /// Upper bound on position, in steps
    pub max_travel_steps: i32,
    /// Discrete moves available per day
    pub slots_per_day: u16,
    /// Minimum real time between two moves
    pub min_move_interval_ms: u32,
    /// Return home at the table's sunset instead of waiting for day end
    pub reset_at_sunset: bool,
    /// Delay between controller ticks
    pub poll_interval_ms: u32,
    /// Monthly sunrise/sunset table
    pub daylight: DaylightTable,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self::compressed()
    }
}

impl CycleConfig {
    /// Time-compressed simulation preset: one day every 2.4 minutes
    pub fn compressed() -> Self {
        let actuator = ActuatorConfig::default();
        Self {
            time_mode: TimeMode::Compressed {
                day_duration_ms: DEFAULT_DAY_DURATION_MS,
            },
            actuator,
            max_travel_steps: actuator.travel_steps(),
            slots_per_day: DEFAULT_SLOTS_PER_DAY,
            min_move_interval_ms: DEFAULT_MIN_MOVE_INTERVAL_MS,
            reset_at_sunset: false,
            poll_interval_ms: 10,
            daylight: DaylightTable::temperate(),
        }
    }

    /// Real-time preset: one move per 15 minutes of daylight, home at sunset
    pub fn realtime() -> Self {
        let actuator = ActuatorConfig::default();
        Self {
            time_mode: TimeMode::Realtime,
            actuator,
            max_travel_steps: actuator.travel_steps(),
            slots_per_day: DEFAULT_SLOTS_PER_DAY,
            min_move_interval_ms: 15 * 60 * 1000,
            reset_at_sunset: true,
            poll_interval_ms: 1000,
            daylight: DaylightTable::temperate(),
        }
    }

    /// Steps advanced by each move
    pub fn steps_per_move(&self) -> i32 {
        if self.slots_per_day == 0 {
            return 0;
        }
        self.max_travel_steps / self.slots_per_day as i32
    }

    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let TimeMode::Compressed { day_duration_ms: 0 } = self.time_mode {
            return Err(ConfigError::ZeroDayDuration);
        }
        if self.slots_per_day == 0 {
            return Err(ConfigError::ZeroSlots);
        }
        if self.steps_per_move() < 1 {
            return Err(ConfigError::TravelTooShort);
        }
        Ok(())
    }
}
