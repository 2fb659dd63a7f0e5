//! Day-cycle task
//!
//! Owns the cycle controller and ticks it at the configured poll
//! interval. Moves block the task until the stepper reaches its target,
//! so a tick never overlaps a move in progress.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Instant, Ticker, Timer};

use heliostat_core::config::CycleConfig;
use heliostat_core::safety::GuardStatus;
use heliostat_core::{CycleController, CycleEvent};
use heliostat_drivers::rtc::Ds3231;
use heliostat_drivers::stepper::HalfStepStepper;

/// DS3231 on the blocking I2C0 bus
pub type Rtc = Ds3231<I2c<'static, I2C0, Blocking>>;

/// 28BYJ-48 driven from four GPIO outputs
pub type Stepper = HalfStepStepper<Output<'static>, Delay>;

/// Day-cycle task
#[embassy_executor::task]
pub async fn cycle_task(rtc: Rtc, stepper: Stepper, config: CycleConfig) {
    info!("Cycle task started");

    let mut controller = match CycleController::start(rtc, stepper, &config, now_ms()) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Cycle start failed: {:?}", e);
            if e.is_fatal() {
                error!("No time source, halting day cycle");
            }
            loop {
                Timer::after_secs(60).await;
            }
        }
    };

    info!(
        "Cycle running: {} steps max, {} steps per move",
        config.max_travel_steps,
        controller.steps_per_move()
    );

    let mut ticker = Ticker::every(Duration::from_millis(config.poll_interval_ms as u64));

    loop {
        ticker.next().await;

        match controller.tick(now_ms()) {
            Ok(event) => log_event(&event),
            Err(e) if e.is_fatal() => error!("Tick failed: {:?}", e),
            Err(e) => warn!("Tick skipped: {:?}", e),
        }

        if controller.guard_status() == GuardStatus::Energized {
            error!("Coils energized while idle");
        }
    }
}

/// Milliseconds since boot
fn now_ms() -> u64 {
    Instant::now().as_millis()
}

fn log_event(event: &CycleEvent) {
    match *event {
        CycleEvent::Moved {
            minute_of_day,
            position,
        } => info!(
            "Minute: {} | Step moved. Total steps: {}",
            minute_of_day, position
        ),
        CycleEvent::Reset {
            reason,
            minute_of_day,
            from_position,
        } => info!(
            "Minute: {} | Reset ({:?}) from {} steps",
            minute_of_day, reason, from_position
        ),
        CycleEvent::Holding {
            minute_of_day,
            reason,
        } => trace!("Minute: {} | Holding ({:?})", minute_of_day, reason),
    }
}
