//! Heliostat - Day-Cycle Actuator Firmware
//!
//! Main firmware binary for RP2040-based boards. A DS3231 real-time
//! clock and a monthly sunrise/sunset table drive a 28BYJ-48 stepper
//! through one sweep per day, returning it home at day end.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use heliostat_core::config::{CycleConfig, TimeMode};
use heliostat_drivers::rtc::Ds3231;
use heliostat_drivers::stepper::HalfStepStepper;

use crate::config::parse_config;

/// Embedded configuration (compiled into firmware)
/// Edit heliostat.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../heliostat.toml");

mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Heliostat firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    match config.time_mode {
        TimeMode::Realtime => info!("Mode: real time"),
        TimeMode::Compressed { day_duration_ms } => {
            info!("Mode: compressed, one day every {} ms", day_duration_ms)
        }
    }

    // DS3231 on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let mut rtc = Ds3231::new(i2c);

    if let Ok(true) = rtc.lost_power() {
        warn!("RTC lost power, time is not valid until set");
    }

    // ULN2003 IN1..IN4 on GPIO8..11, given in half-step phase order
    let coils = [
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_9, Level::Low),
        Output::new(p.PIN_11, Level::Low),
    ];
    let stepper = HalfStepStepper::new(coils, Delay);

    info!("RTC and stepper initialized");

    spawner.spawn(tasks::cycle_task(rtc, stepper, config)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration
///
/// Falls back to the compressed-simulation preset if heliostat.toml
/// does not parse.
fn load_config() -> CycleConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // This should never happen if heliostat.toml passed build.rs
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using compressed-simulation fallback configuration");
            CycleConfig::compressed()
        }
    }
}
