//! Actuator driver traits
//!
//! The actuator is a position-controlled stepper with no homing sensor.
//! Position is an absolute step count relative to where the driver was
//! powered up (home = 0).

/// Trait for position-controlled stepper drivers
///
/// The interface is polled: `move_to` sets a target and `run` is called
/// repeatedly until `distance_to_go` reaches zero.
pub trait ActuatorDriver {
    /// Set an absolute target position in steps
    fn move_to(&mut self, target: i32);

    /// Advance at most one step toward the target
    ///
    /// Returns true while steps remain.
    fn run(&mut self) -> bool;

    /// Signed steps remaining to the target
    fn distance_to_go(&self) -> i32;

    /// Current absolute position in steps
    fn current_position(&self) -> i32;

    /// Set the speed ceiling in steps per second
    fn set_max_speed(&mut self, steps_per_s: u16);

    /// Set the constant stepping speed in steps per second
    ///
    /// Values above the configured maximum are clamped.
    fn set_speed(&mut self, steps_per_s: u16);

    /// Block until the target is reached
    ///
    /// Moves are atomic with respect to the control loop: there is no
    /// cancellation once a target has been set.
    fn run_to_target(&mut self) {
        while self.distance_to_go() != 0 {
            self.run();
        }
    }
}

/// Motor winding outputs
pub trait CoilOutputs {
    /// Drive every winding output inactive
    fn de_energize(&mut self);

    /// Check if any winding output is currently driven
    fn is_energized(&self) -> bool;
}
