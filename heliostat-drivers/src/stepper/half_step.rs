//! Four-wire half-step stepper driver
//!
//! Drives a unipolar stepper (28BYJ-48 through a ULN2003 board) by
//! switching its four windings directly from GPIO. Half-stepping
//! alternates one and two energized windings, giving 8 phases per
//! electrical cycle and 4096 half-steps per output revolution on the
//! 28BYJ-48. The default `ActuatorConfig::steps_per_revolution` of 2048
//! therefore maps configured degrees onto half the physical angle.
//!
//! # Pin order
//!
//! Pins are given in phase order, which on the ULN2003 board is
//! `[IN1, IN3, IN2, IN4]`. Bit `i` of each sequence entry drives `pins[i]`.
//!
//! Stepping is blocking: each call to `run` that takes a step waits one
//! step interval on the supplied delay before returning.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use heliostat_core::traits::{ActuatorDriver, CoilOutputs};

/// Half-step winding patterns, indexed by `position & 7`
pub const HALF_STEP_SEQUENCE: [u8; 8] = [
    0b0001, 0b0101, 0b0100, 0b0110, 0b0010, 0b1010, 0b1000, 0b1001,
];

/// Speed ceiling when none is configured (steps/s)
const DEFAULT_MAX_SPEED: u16 = 500;

/// Stepping speed when none is configured (steps/s)
const DEFAULT_SPEED: u16 = 300;

/// Four-wire half-step stepper
pub struct HalfStepStepper<P, D> {
    /// Winding outputs in phase order
    pins: [P; 4],
    delay: D,
    /// Absolute position in steps
    position: i32,
    /// Target position in steps
    target: i32,
    /// Speed ceiling in steps/s
    max_speed: u16,
    /// Stepping speed in steps/s (never zero)
    speed: u16,
    /// Windings currently driven
    energized: bool,
}

impl<P, D> HalfStepStepper<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Create a new driver at position 0 with every winding released
    pub fn new(pins: [P; 4], delay: D) -> Self {
        let mut stepper = Self {
            pins,
            delay,
            position: 0,
            target: 0,
            max_speed: DEFAULT_MAX_SPEED,
            speed: DEFAULT_SPEED,
            energized: false,
        };
        stepper.de_energize();
        stepper
    }

    /// Current stepping speed in steps/s
    pub fn speed(&self) -> u16 {
        self.speed
    }

    /// Time between steps in microseconds
    pub fn step_interval_us(&self) -> u32 {
        1_000_000 / self.speed as u32
    }

    /// Drive the winding pattern for the current position
    fn apply_phase(&mut self) {
        let pattern = HALF_STEP_SEQUENCE[(self.position & 7) as usize];
        self.write_pattern(pattern);
        self.energized = pattern != 0;
    }

    fn write_pattern(&mut self, pattern: u8) {
        for (i, pin) in self.pins.iter_mut().enumerate() {
            let state = PinState::from(pattern & (1 << i) != 0);
            match pin.set_state(state) {
                Ok(()) => {}
                Err(never) => match never {},
            }
        }
    }
}

impl<P, D> ActuatorDriver for HalfStepStepper<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    fn move_to(&mut self, target: i32) {
        self.target = target;
    }

    fn run(&mut self) -> bool {
        let remaining = self.distance_to_go();
        if remaining == 0 {
            return false;
        }

        self.position += remaining.signum();
        self.apply_phase();
        self.delay.delay_us(self.step_interval_us());

        self.distance_to_go() != 0
    }

    fn distance_to_go(&self) -> i32 {
        self.target - self.position
    }

    fn current_position(&self) -> i32 {
        self.position
    }

    fn set_max_speed(&mut self, steps_per_s: u16) {
        self.max_speed = steps_per_s.max(1);
        self.speed = self.speed.min(self.max_speed);
    }

    fn set_speed(&mut self, steps_per_s: u16) {
        self.speed = steps_per_s.clamp(1, self.max_speed);
    }
}

impl<P, D> CoilOutputs for HalfStepStepper<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    fn de_energize(&mut self) {
        self.write_pattern(0);
        self.energized = false;
    }

    fn is_energized(&self) -> bool {
        self.energized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Pin(Rc<Cell<bool>>);

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    /// Delay that only accumulates requested time
    #[derive(Clone, Default)]
    struct Clock(Rc<Cell<u64>>);

    impl DelayNs for Clock {
        fn delay_ns(&mut self, ns: u32) {
            self.0.set(self.0.get() + ns as u64);
        }
    }

    fn stepper() -> (HalfStepStepper<Pin, Clock>, [Pin; 4], Clock) {
        let pins: [Pin; 4] = Default::default();
        let clock = Clock::default();
        let stepper = HalfStepStepper::new(pins.clone(), clock.clone());
        (stepper, pins, clock)
    }

    fn pattern(pins: &[Pin; 4]) -> u8 {
        pins.iter()
            .enumerate()
            .fold(0, |acc, (i, p)| acc | ((p.0.get() as u8) << i))
    }

    #[test]
    fn test_new_releases_windings() {
        let (stepper, pins, _) = stepper();
        assert!(!stepper.is_energized());
        assert_eq!(pattern(&pins), 0);
        assert_eq!(stepper.current_position(), 0);
    }

    #[test]
    fn test_forward_sequence() {
        let (mut stepper, pins, _) = stepper();
        stepper.move_to(8);

        for expected in 1..=8 {
            stepper.run();
            assert_eq!(stepper.current_position(), expected);
            assert_eq!(pattern(&pins), HALF_STEP_SEQUENCE[(expected & 7) as usize]);
            assert!(stepper.is_energized());
        }
        assert!(!stepper.run());
    }

    #[test]
    fn test_reverse_to_home() {
        let (mut stepper, pins, _) = stepper();
        stepper.move_to(10);
        stepper.run_to_target();

        stepper.move_to(0);
        stepper.run();
        assert_eq!(stepper.current_position(), 9);
        assert_eq!(pattern(&pins), HALF_STEP_SEQUENCE[1]);

        stepper.run_to_target();
        assert_eq!(stepper.current_position(), 0);
        assert_eq!(pattern(&pins), HALF_STEP_SEQUENCE[0]);
    }

    #[test]
    fn test_de_energize_after_move() {
        let (mut stepper, pins, _) = stepper();
        stepper.move_to(3);
        stepper.run_to_target();
        assert!(stepper.is_energized());

        stepper.de_energize();
        assert!(!stepper.is_energized());
        assert_eq!(pattern(&pins), 0);
        assert_eq!(stepper.current_position(), 3);
    }

    #[test]
    fn test_speed_clamped_to_max() {
        let (mut stepper, _, _) = stepper();
        stepper.set_max_speed(500);
        stepper.set_speed(800);
        assert_eq!(stepper.speed(), 500);

        stepper.set_speed(0);
        assert_eq!(stepper.speed(), 1);

        stepper.set_speed(300);
        stepper.set_max_speed(200);
        assert_eq!(stepper.speed(), 200);
    }

    #[test]
    fn test_step_timing() {
        let (mut stepper, _, clock) = stepper();
        stepper.set_max_speed(500);
        stepper.set_speed(250);
        stepper.move_to(10);
        stepper.run_to_target();

        // 10 steps at 4 ms each
        assert_eq!(clock.0.get(), 40_000_000);
    }

    #[test]
    fn test_no_step_no_delay() {
        let (mut stepper, pins, clock) = stepper();
        assert!(!stepper.run());
        assert_eq!(clock.0.get(), 0);
        assert_eq!(pattern(&pins), 0);
    }

    proptest! {
        #[test]
        fn prop_reaches_any_target(start in -500i32..500, target in -500i32..500) {
            let (mut stepper, pins, _) = stepper();
            stepper.move_to(start);
            stepper.run_to_target();
            stepper.move_to(target);
            stepper.run_to_target();

            prop_assert_eq!(stepper.current_position(), target);
            prop_assert_eq!(stepper.distance_to_go(), 0);
            if start != 0 || target != 0 {
                prop_assert_eq!(pattern(&pins), HALF_STEP_SEQUENCE[(target & 7) as usize]);
            }
        }
    }
}
