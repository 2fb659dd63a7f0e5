//! Cycle controller coordinating time mapping, planning, and safety
//!
//! The controller is the single owner of every piece of mutable cycle
//! state. Once per poll tick it:
//! - Reads the clock and maps it to a minute of day
//! - Detects the day boundary and returns the actuator home
//! - Asks the planner whether a daylight move is due and executes it
//! - Releases the windings after every completed move or reset

use crate::config::{CycleConfig, DaylightTable};
use crate::error::CycleError;
use crate::motion::{MoveRequest, PlanDecision, PlanInput, PositionPlanner};
use crate::safety::{CoilGuard, GuardStatus};
use crate::state::{CycleState, Trigger};
use crate::time::TimeMapper;
use crate::traits::{ActuatorDriver, ClockError, ClockSource, CoilOutputs, DateTime};

pub use crate::motion::HoldReason;

/// Why the actuator was sent home
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetReason {
    /// Compressed simulated day finished
    DayEnded,
    /// Wall-clock date rolled over
    Midnight,
    /// Daylight-table sunset reached
    Sunset,
}

/// Outcome of one controller tick, for the diagnostic log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleEvent {
    /// Completed a daylight move
    Moved {
        /// Minute of day the move was planned at
        minute_of_day: u16,
        /// Cumulative position after the move
        position: i32,
    },
    /// Returned home
    Reset {
        /// What triggered the reset
        reason: ResetReason,
        /// Minute of day the reset happened at
        minute_of_day: u16,
        /// Position before the reset
        from_position: i32,
    },
    /// No movement this tick
    Holding {
        /// Current minute of day
        minute_of_day: u16,
        /// Why no move was made
        reason: HoldReason,
    },
}

/// Day-cycle controller
pub struct CycleController<C, A> {
    /// Wall-clock source
    clock: C,
    /// Stepper driver (also owns the winding outputs)
    actuator: A,
    /// Current cycle state
    state: CycleState,
    /// Real-time or compressed minute mapping
    mapper: TimeMapper,
    /// Slot planner
    planner: PositionPlanner,
    /// Winding release guard
    guard: CoilGuard,
    /// Result of the most recent guard release
    guard_status: GuardStatus,
    /// Monthly sunrise/sunset table
    daylight: DaylightTable,
    /// Go home at sunset rather than waiting for the day boundary
    reset_at_sunset: bool,
    /// Position in steps from home
    position: i32,
    /// Moves since the last reset
    moves_today: u16,
    /// Monotonic time of the last move
    last_move_ms: Option<u64>,
    /// Previous clock reading and its minute of day (rollover detection)
    last_reading: Option<(DateTime, u16)>,
    /// Sunset reset already done for the current day
    day_closed: bool,
    /// Resets performed since start
    resets: u32,
}

impl<C, A> CycleController<C, A>
where
    C: ClockSource,
    A: ActuatorDriver + CoilOutputs,
{
    /// Initialize the clock and actuator and enter IDLE at home
    ///
    /// The windings are released before anything else. Fails with
    /// [`CycleError::ClockUnavailable`] when the clock does not answer;
    /// there is no fallback time source, so the caller must halt.
    pub fn start(
        mut clock: C,
        mut actuator: A,
        config: &CycleConfig,
        now_ms: u64,
    ) -> Result<Self, CycleError> {
        let mut guard = CoilGuard::new();
        let guard_status = guard.secure(&mut actuator);

        clock.begin().map_err(|_| CycleError::ClockUnavailable)?;

        actuator.set_max_speed(config.actuator.max_speed);
        actuator.set_speed(config.actuator.speed);

        Ok(Self {
            clock,
            actuator,
            state: CycleState::Idle,
            mapper: TimeMapper::new(config.time_mode, now_ms),
            planner: PositionPlanner::new(config),
            guard,
            guard_status,
            daylight: config.daylight.clone(),
            reset_at_sunset: config.reset_at_sunset,
            position: 0,
            moves_today: 0,
            last_move_ms: None,
            last_reading: None,
            day_closed: false,
            resets: 0,
        })
    }

    /// Run one control tick
    ///
    /// `now_ms` is monotonic time since boot. Errors leave the actuator
    /// where it is; the next tick starts fresh. A reading that fails
    /// validation is never kept for rollover detection. Every tick ends
    /// with a coil check, so `guard_status` also reflects idle ticks.
    pub fn tick(&mut self, now_ms: u64) -> Result<CycleEvent, CycleError> {
        let result = self.step(now_ms);
        self.guard_status = self.guard.check(self.state, &self.actuator);
        result
    }

    fn step(&mut self, now_ms: u64) -> Result<CycleEvent, CycleError> {
        let now = self.clock.now()?;

        // A bad reading must not reach rollover detection or be remembered
        let window = self.daylight.lookup(self.mapper.month(&now))?;
        if !now.is_valid() {
            return Err(CycleError::ClockRead(ClockError::InvalidData));
        }

        if let Some(reason) = self.day_boundary(&now, now_ms) {
            let minute = self.mapper.minute_of_day(&now, now_ms);
            let event = self.reset(reason, minute);
            // Next epoch starts at the tick that saw the day end; the
            // blocking return home counts toward the new day's night.
            self.mapper.start_new_day(now_ms);
            self.day_closed = false;
            self.last_reading = Some((now, now.minute_of_day()));
            return Ok(event);
        }

        let minute = self.mapper.minute_of_day(&now, now_ms);
        self.last_reading = Some((now, now.minute_of_day()));

        if self.reset_at_sunset && !self.day_closed && window.is_after_sunset(minute) {
            self.day_closed = true;
            return Ok(self.reset(ResetReason::Sunset, minute));
        }

        let decision = self.planner.plan(&PlanInput {
            minute_of_day: minute,
            window,
            position: self.position,
            moves_today: self.moves_today,
            now_ms,
            last_move_ms: self.last_move_ms,
        });

        match decision {
            PlanDecision::Move(request) => Ok(self.advance(request, minute, now_ms)),
            PlanDecision::Hold(reason) => Ok(CycleEvent::Holding {
                minute_of_day: minute,
                reason,
            }),
        }
    }

    /// Detect the end of the current day
    fn day_boundary(&self, now: &DateTime, now_ms: u64) -> Option<ResetReason> {
        match self.mapper.day_ended(now_ms) {
            Some(true) => Some(ResetReason::DayEnded),
            Some(false) => None,
            None => {
                let (last, last_minute) = self.last_reading?;
                if !now.same_date(&last) || now.minute_of_day() < last_minute {
                    Some(ResetReason::Midnight)
                } else {
                    None
                }
            }
        }
    }

    /// IDLE -> ADVANCING -> IDLE
    fn advance(&mut self, request: MoveRequest, minute: u16, now_ms: u64) -> CycleEvent {
        self.state = self.state.transition(Trigger::MovePlanned);
        self.drive(request);
        self.state = self.state.transition(Trigger::MoveComplete);
        self.guard_status = self.guard.secure(&mut self.actuator);

        self.position = request.target_position;
        self.moves_today = self.moves_today.saturating_add(1);
        self.last_move_ms = Some(now_ms);

        CycleEvent::Moved {
            minute_of_day: minute,
            position: self.position,
        }
    }

    /// (IDLE | ADVANCING) -> RESETTING -> IDLE
    fn reset(&mut self, reason: ResetReason, minute: u16) -> CycleEvent {
        let from_position = self.position;

        self.state = self.state.transition(Trigger::DayEnded);
        self.drive(MoveRequest::home());
        self.state = self.state.transition(Trigger::HomeReached);
        self.guard_status = self.guard.secure(&mut self.actuator);

        self.position = 0;
        self.moves_today = 0;
        self.resets = self.resets.wrapping_add(1);

        CycleEvent::Reset {
            reason,
            minute_of_day: minute,
            from_position,
        }
    }

    /// Command a move
    ///
    /// Requests that must complete before the windings are released block
    /// until the driver reports completion; others take a single step.
    fn drive(&mut self, request: MoveRequest) {
        self.actuator.move_to(request.target_position);
        if request.must_complete_before_safety {
            self.actuator.run_to_target();
        } else {
            self.actuator.run();
        }
    }

    /// Current cycle state
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Position in steps from home
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Moves completed since the last reset
    pub fn moves_today(&self) -> u16 {
        self.moves_today
    }

    /// Resets performed since start
    pub fn reset_count(&self) -> u32 {
        self.resets
    }

    /// Result of the most recent winding release
    pub fn guard_status(&self) -> GuardStatus {
        self.guard_status
    }

    /// Winding releases performed since start (including start-up)
    pub fn release_count(&self) -> u32 {
        self.guard.release_count()
    }

    /// Time mapper in use
    pub fn mapper(&self) -> &TimeMapper {
        &self.mapper
    }

    /// Steps per move from the planner
    pub fn steps_per_move(&self) -> i32 {
        self.planner.steps_per_move()
    }

    /// Borrow the actuator driver
    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}
