//! Motion Loop (§4.4): the timed worker that drives step pulses.
//!
//! Runs as a tight loop calling [`MotionLoop::tick`] once per iteration.
//! Each tick takes the motion mutex only for brief critical sections
//! around state reads/writes; GPIO calls happen outside the lock.
//! Hardware errors are reported through the Controller's fault log and
//! otherwise swallowed — a stuck pin must never stall step timing.

use std::time::Instant;

use winder_common::consts::{PACE_SLEEP_CAP, PAUSE_GATE_SLEEP, STEP_PULSE_WIDTH};
use winder_common::error::WinderError;
use winder_common::pins::{Level, Pin};

use crate::controller::Controller;
use crate::kinematics::Kinematics;
use crate::state::Job;

/// What happened on one call to [`MotionLoop::tick`]. Mostly useful for
/// tests driving the loop step by step; production code ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// `job != RUN`; the idle gate slept and nothing moved.
    Idle,
    /// `job == RUN` but the X deadline hasn't arrived yet.
    Paced,
    /// An X step was emitted (and possibly Y steps alongside it).
    Stepped,
    /// The armed goal was consumed this tick; motors disabled.
    GoalReached,
}

pub struct MotionLoop {
    controller: Controller,
    next_x_deadline: Instant,
}

impl MotionLoop {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            next_x_deadline: Instant::now(),
        }
    }

    fn try_gpio<T>(&self, result: Result<T, WinderError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.controller.report_hw_fault(&e);
                None
            }
        }
    }

    /// Run one iteration: home scan, run gate, pacing, X step, X
    /// accounting and Y accumulation, in that order (§4.4).
    pub fn tick(&mut self) -> TickOutcome {
        self.scan_y_home();

        let job = { self.controller.shared().lock().unwrap().motion.job };
        if job != Job::Run {
            self.next_x_deadline = Instant::now();
            std::thread::sleep(PAUSE_GATE_SLEEP);
            return TickOutcome::Idle;
        }

        let now = Instant::now();
        if now < self.next_x_deadline {
            let remaining = self.next_x_deadline - now;
            std::thread::sleep(remaining.min(PACE_SLEEP_CAP));
            return TickOutcome::Paced;
        }

        let (x_dir_sign, kinematics) = {
            let shared = self.controller.shared().lock().unwrap();
            (shared.config.x_dir_sign, Kinematics::compute(&shared.config))
        };
        self.next_x_deadline += kinematics.x_interval;

        let dir_level = Level::from_bool(x_dir_sign > 0);
        if self.try_gpio(self.controller.port().set_output(Pin::XDir, dir_level)).is_some() {
            self.try_gpio(self.controller.port().pulse(Pin::XStep, STEP_PULSE_WIDTH));
        }

        let goal_consumed = self.account_x_step();
        if goal_consumed {
            self.try_gpio(
                self.controller
                    .port()
                    .set_output(Pin::MotorEnable, Level::High),
            );
            self.controller.handle_goal_reached();
            return TickOutcome::GoalReached;
        }

        self.accumulate_y(kinematics.y_step_per_xstep);
        TickOutcome::Stepped
    }

    fn scan_y_home(&self) {
        let engaged = match self.try_gpio(self.controller.port().read_input(Pin::YLimit)) {
            Some(level) => level == Level::Low,
            None => return,
        };
        let mut shared = self.controller.shared().lock().unwrap();
        if engaged {
            if shared.yhome.armed && !shared.yhome.done {
                shared.motion.y_pos_steps = 0;
                shared.yhome.done = true;
                shared.yhome.armed = false;
            }
        } else {
            shared.yhome.done = false;
        }
    }

    /// Advance `x_steps_mod`/`turns_x`, adding the fractional Y carry for
    /// this step unless a goal is consumed this tick (§4.4 step 5).
    /// Returns whether a goal was consumed.
    fn account_x_step(&self) -> bool {
        let mut shared = self.controller.shared().lock().unwrap();
        shared.motion.x_steps_mod += 1;
        let mut goal_consumed = false;
        if shared.motion.x_steps_mod >= shared.config.x_steps_per_rev {
            shared.motion.x_steps_mod -= shared.config.x_steps_per_rev;
            shared.motion.turns_x += 1;
            if shared.motion.goal_turns > 0
                && shared.motion.turns_x >= shared.motion.goal_turns as u64
            {
                shared.motion.job = Job::Pause;
                goal_consumed = true;
            }
        }
        goal_consumed
    }

    /// Accumulate the fractional Y carry and emit whole Y steps, flipping
    /// direction at either bobbin edge (triangle-wave layer bounce,
    /// §4.4 step 6, §3 invariant).
    fn accumulate_y(&self, y_step_per_xstep: f64) {
        {
            let mut shared = self.controller.shared().lock().unwrap();
            shared.motion.y_acc += y_step_per_xstep;
        }
        // y_step_per_xstep can itself exceed 1 at extreme pitch; drain
        // one whole step per loop trip so direction flips land on the
        // correct microstep. The carry is added once, above, not on
        // every trip through this loop.
        loop {
            let step = {
                let mut shared = self.controller.shared().lock().unwrap();
                if shared.motion.y_acc < 1.0 {
                    return;
                }
                shared.motion.y_acc -= 1.0;

                let bobbin_width = shared.config.bobbin_width_mm;
                let y_steps_per_mm = shared.config.y_steps_per_mm;
                let y_mm = shared.motion.y_pos_steps as f64 / y_steps_per_mm;
                if shared.motion.y_dir_sign > 0 && y_mm >= bobbin_width {
                    shared.motion.y_dir_sign = -1;
                } else if shared.motion.y_dir_sign < 0 && y_mm <= 0.0 {
                    shared.motion.y_dir_sign = 1;
                }
                let dir = shared.motion.y_dir_sign;
                shared.motion.y_pos_steps += dir as i64;
                dir
            };
            let level = Level::from_bool(step > 0);
            if self
                .try_gpio(self.controller.port().set_output(Pin::YDir, level))
                .is_some()
            {
                self.try_gpio(self.controller.port().pulse(Pin::YStep, STEP_PULSE_WIDTH));
            }
        }
    }
}
