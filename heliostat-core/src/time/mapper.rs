//! Time mapper implementation
//!
//! In real-time mode the minute of day is read from the wall clock and
//! the day boundary is midnight. In compressed mode a whole simulated
//! day passes every `day_duration_ms` of monotonic time, measured from
//! an epoch that restarts at each simulated day end. The month always
//! comes from the wall clock: the calendar does not compress.

use crate::config::TimeMode;
use crate::traits::clock::{DateTime, MINUTES_PER_DAY};

/// Epoch of the current simulated day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimulationClock {
    /// Monotonic time at which the current simulated day began
    epoch_start_ms: u64,
    /// Real milliseconds per simulated day
    day_duration_ms: u32,
}

impl SimulationClock {
    /// Start a simulated day at `now_ms`
    pub fn new(day_duration_ms: u32, now_ms: u64) -> Self {
        Self {
            epoch_start_ms: now_ms,
            day_duration_ms,
        }
    }

    /// Monotonic time at which the current simulated day began
    pub fn epoch_start_ms(&self) -> u64 {
        self.epoch_start_ms
    }

    /// Real milliseconds per simulated day
    pub fn day_duration_ms(&self) -> u32 {
        self.day_duration_ms
    }

    /// Real time elapsed in the current simulated day
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.epoch_start_ms)
    }

    /// Simulated minute of day, clamped to 0-1439
    pub fn minute_of_day(&self, now_ms: u64) -> u16 {
        if self.day_duration_ms == 0 {
            return MINUTES_PER_DAY - 1;
        }
        let minutes = self.elapsed_ms(now_ms) * MINUTES_PER_DAY as u64 / self.day_duration_ms as u64;
        minutes.min(MINUTES_PER_DAY as u64 - 1) as u16
    }

    /// Check if the simulated day is over
    pub fn day_ended(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.day_duration_ms as u64
    }

    /// Begin the next simulated day at `now_ms`
    pub fn restart(&mut self, now_ms: u64) {
        self.epoch_start_ms = now_ms;
    }
}

/// Maps wall time onto the day cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeMapper {
    /// Minute of day from the wall clock
    Realtime,
    /// Minute of day from elapsed monotonic time
    Compressed(SimulationClock),
}

impl TimeMapper {
    /// Create the mapper for a configured mode, starting at `now_ms`
    pub fn new(mode: TimeMode, now_ms: u64) -> Self {
        match mode {
            TimeMode::Realtime => TimeMapper::Realtime,
            TimeMode::Compressed { day_duration_ms } => {
                TimeMapper::Compressed(SimulationClock::new(day_duration_ms, now_ms))
            }
        }
    }

    /// Minute of day, always in 0-1439
    pub fn minute_of_day(&self, now: &DateTime, now_ms: u64) -> u16 {
        match self {
            TimeMapper::Realtime => now.minute_of_day(),
            TimeMapper::Compressed(sim) => sim.minute_of_day(now_ms),
        }
    }

    /// Calendar month used for the daylight lookup
    pub fn month(&self, now: &DateTime) -> u8 {
        now.month
    }

    /// Day-end predicate
    ///
    /// Only compressed mode has an explicit day end; real-time mode
    /// returns `None` and relies on rollover detection by the caller.
    pub fn day_ended(&self, now_ms: u64) -> Option<bool> {
        match self {
            TimeMapper::Realtime => None,
            TimeMapper::Compressed(sim) => Some(sim.day_ended(now_ms)),
        }
    }

    /// Start the next day's epoch (no-op in real-time mode)
    pub fn start_new_day(&mut self, now_ms: u64) {
        if let TimeMapper::Compressed(sim) = self {
            sim.restart(now_ms);
        }
    }

    /// Current simulation clock, if compressed
    pub fn simulation(&self) -> Option<&SimulationClock> {
        match self {
            TimeMapper::Realtime => None,
            TimeMapper::Compressed(sim) => Some(sim),
        }
    }
}
