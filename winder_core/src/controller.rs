//! Controller (§4.5): the operation surface the engine host and CLI drive.
//!
//! All mutable state reachable from more than one thread sits behind a
//! single `shared` mutex (configuration, motion state, Y-home state,
//! section plan) so no operation ever observes a half-applied update. The
//! encoder keeps its own, separate mutex (§3) since it is written from an
//! edge callback that must never wait on Controller operations.

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use tracing::info;
use winder_common::config::WinderConfig;
use winder_common::consts::{RPM_MAX, RPM_MIN, STOP_GRACE};
use winder_common::error::{WinderError, WinderResult};
use winder_common::pins::{Level, Pin};
use winder_hal::GpioPort;

use crate::encoder::EncoderMonitor;
use crate::fault::FaultLog;
use crate::snapshot::StatusSnapshot;
use crate::state::{Job, MotionState, SectionPlan, YHomeState};

pub(crate) struct Shared {
    pub config: WinderConfig,
    pub motion: MotionState,
    pub yhome: YHomeState,
    pub section: SectionPlan,
}

struct ControllerInner {
    shared: Mutex<Shared>,
    port: Arc<dyn GpioPort>,
    encoder: Arc<EncoderMonitor>,
    fault_log: FaultLog,
}

/// Cheaply cloneable handle onto the engine's shared state. Both the
/// process binary and the Motion Loop hold a clone; the loop uses it only
/// to invoke [`Controller::handle_goal_reached`] after releasing its own
/// lock on `shared`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

impl Controller {
    pub fn new(port: Arc<dyn GpioPort>, config: WinderConfig) -> Self {
        let encoder = Arc::new(EncoderMonitor::new());
        if let Err(e) = encoder.install(port.clone()) {
            tracing::error!(error = %e, "failed to attach encoder edge callback");
        }
        Self {
            inner: Arc::new(ControllerInner {
                shared: Mutex::new(Shared {
                    config,
                    motion: MotionState::default(),
                    yhome: YHomeState::default(),
                    section: SectionPlan::default(),
                }),
                port,
                encoder,
                fault_log: FaultLog::new(),
            }),
        }
    }

    pub(crate) fn shared(&self) -> &Mutex<Shared> {
        &self.inner.shared
    }

    pub(crate) fn port(&self) -> &Arc<dyn GpioPort> {
        &self.inner.port
    }

    pub(crate) fn encoder(&self) -> &Arc<EncoderMonitor> {
        &self.inner.encoder
    }

    pub(crate) fn report_hw_fault(&self, err: &WinderError) {
        self.inner.fault_log.report(err);
    }

    fn set_motor_enable(&self, level: Level) {
        if let Err(e) = self.inner.port.set_output(Pin::MotorEnable, level) {
            self.report_hw_fault(&e);
        }
    }

    // -- setters (§4.5) -----------------------------------------------

    /// Clamp and apply a new target spindle speed.
    pub fn set_rpm(&self, rpm: u32) {
        let clamped = rpm.clamp(RPM_MIN, RPM_MAX);
        self.inner.shared.lock().unwrap().config.rpm = clamped;
    }

    /// Set the Y advance per X revolution. Rejects negative pitch.
    pub fn set_pitch(&self, pitch_mm: f64) -> WinderResult<()> {
        if pitch_mm < 0.0 {
            return Err(WinderError::Validation(format!(
                "pitch_mm {pitch_mm} must be >= 0"
            )));
        }
        self.inner.shared.lock().unwrap().config.pitch_mm = pitch_mm;
        Ok(())
    }

    /// Set the usable bobbin width. Rejects non-positive values.
    pub fn set_bwidth(&self, bobbin_width_mm: f64) -> WinderResult<()> {
        if !(bobbin_width_mm > 0.0) {
            return Err(WinderError::Validation(format!(
                "bobbin_width_mm {bobbin_width_mm} must be > 0"
            )));
        }
        self.inner.shared.lock().unwrap().config.bobbin_width_mm = bobbin_width_mm;
        Ok(())
    }

    /// Set X microsteps-per-revolution and direction from a signed value:
    /// the sign selects `x_dir_sign`, the magnitude (clamped to >= 1)
    /// becomes `x_steps_per_rev`.
    pub fn set_xrev(&self, signed_steps: i64) {
        let sign: i8 = if signed_steps < 0 { -1 } else { 1 };
        let magnitude = signed_steps.unsigned_abs().max(1);
        let mut shared = self.inner.shared.lock().unwrap();
        shared.config.x_dir_sign = sign;
        shared.config.x_steps_per_rev = magnitude.min(u32::MAX as u64) as u32;
    }

    /// Set Y microsteps per millimeter. Rejects non-positive values.
    pub fn set_ycal(&self, y_steps_per_mm: f64) -> WinderResult<()> {
        if !(y_steps_per_mm > 0.0) {
            return Err(WinderError::Validation(format!(
                "y_steps_per_mm {y_steps_per_mm} must be > 0"
            )));
        }
        self.inner.shared.lock().unwrap().config.y_steps_per_mm = y_steps_per_mm;
        Ok(())
    }

    /// Arm (n > 0) or clear (n <= 0) the plain turn-count goal.
    pub fn goal(&self, n: i64) {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.motion.goal_turns = if n > 0 { n } else { -1 };
    }

    /// Move Y's logical zero to the current position.
    pub fn yzero(&self) {
        self.inner.shared.lock().unwrap().motion.y_pos_steps = 0;
    }

    // -- job lifecycle (§4.5, §4.6) ------------------------------------

    /// IDLE -> RUN only; resets turns_x, x_steps_mod and the encoder. A
    /// no-op from RUN or PAUSE (PAUSE -> RUN only ever happens through
    /// [`Controller::resume`] or the goal-reached auto-next path).
    pub fn run(&self) {
        let mut shared = self.inner.shared.lock().unwrap();
        if shared.motion.job != Job::Idle {
            return;
        }
        self.reset_and_enter_run(&mut shared);
        drop(shared);
        self.set_motor_enable(Level::Low);
        info!("run: idle -> run");
    }

    fn reset_and_enter_run(&self, shared: &mut Shared) {
        shared.motion.turns_x = 0;
        shared.motion.x_steps_mod = 0;
        shared.motion.job = Job::Run;
        self.inner.encoder.reset();
    }

    /// Begin a fresh winding program: `total` turns, optionally split
    /// into `sections` sections. Always forces a RUN transition and
    /// resets counters, regardless of the prior job.
    pub fn start(&self, total: i64, sections: u32, auto_next: bool) -> WinderResult<()> {
        if total <= 0 {
            return Err(WinderError::Precondition(
                "start requires total > 0".into(),
            ));
        }
        let mut shared = self.inner.shared.lock().unwrap();
        shared.section = SectionPlan::default();
        if sections > 0 {
            let plan = SectionPlan::distribute(total as u32, sections);
            let first = plan[0] as i64;
            shared.section.sections_mode = true;
            shared.section.plan = plan;
            shared.section.ptr = 0;
            shared.section.auto_next = auto_next;
            shared.motion.goal_turns = first;
        } else {
            shared.section.sections_mode = false;
            shared.section.auto_next = auto_next;
            shared.motion.goal_turns = total;
        }
        self.reset_and_enter_run(&mut shared);
        drop(shared);
        self.set_motor_enable(Level::Low);
        info!(total, sections, auto_next, "start: new winding program");
        Ok(())
    }

    /// PAUSE/IDLE -> RUN, preserving turns_x, x_steps_mod and encoder
    /// ticks. If paused mid-section, recomputes the goal for the next
    /// section from the current turn count before resuming.
    pub fn resume(&self) {
        let mut shared = self.inner.shared.lock().unwrap();
        if shared.motion.job == Job::Run {
            return;
        }
        // Only recompute the goal when the pause was caused by the
        // previous goal being consumed (turns_x already caught up to
        // it) -- a manual mid-section stop() must resume against the
        // same unconsumed goal, not skip ahead by a whole section.
        let goal_just_consumed = shared.motion.turns_x as i64 >= shared.motion.goal_turns;
        if shared.section.sections_mode
            && shared.section.ptr < shared.section.plan.len()
            && goal_just_consumed
        {
            let next_size = shared.section.plan[shared.section.ptr] as i64;
            shared.motion.goal_turns = shared.motion.turns_x as i64 + next_size;
        }
        shared.motion.job = Job::Run;
        drop(shared);
        self.set_motor_enable(Level::Low);
        info!("resume: -> run");
    }

    /// RUN -> PAUSE immediately; motor stays enabled for a grace period
    /// to let the spindle coast down before disabling, on a best-effort
    /// basis (not cancelled if the operator resumes during the grace
    /// window; it simply checks the job is still PAUSE before acting).
    pub fn stop(&self) {
        let mut shared = self.inner.shared.lock().unwrap();
        if shared.motion.job != Job::Run {
            return;
        }
        shared.motion.job = Job::Pause;
        drop(shared);
        info!("stop: run -> pause");
        let ctrl = self.clone();
        thread::spawn(move || {
            thread::sleep(STOP_GRACE);
            let still_paused = ctrl.inner.shared.lock().unwrap().motion.job == Job::Pause;
            if still_paused {
                ctrl.set_motor_enable(Level::High);
            }
        });
    }

    /// Called by the Motion Loop after it has already released `shared`
    /// and disabled the motor, once a goal is consumed (§4.5 "Goal-reached
    /// handler").
    pub(crate) fn handle_goal_reached(&self) {
        let (sections_mode, ptr, plan_len) = {
            let shared = self.inner.shared.lock().unwrap();
            (
                shared.section.sections_mode,
                shared.section.ptr,
                shared.section.plan.len(),
            )
        };
        if !sections_mode || ptr >= plan_len {
            info!("goal reached: winding complete");
            return;
        }

        let ptr_after = ptr + 1;
        {
            let mut shared = self.inner.shared.lock().unwrap();
            shared.section.ptr = ptr_after;
        }

        if ptr_after >= plan_len {
            info!("goal reached: final section complete");
            return;
        }

        self.yzero();
        let auto_next = self.inner.shared.lock().unwrap().section.auto_next;
        if !auto_next {
            info!(section = ptr_after, "goal reached: awaiting resume");
            return;
        }

        // The cooldown must not block the caller: handle_goal_reached runs
        // on the Motion Loop thread itself, which may only suspend in its
        // own pause-gate/pace/pulse sleeps (§5). Offload it the same way
        // stop() offloads its motor-disable grace.
        let ctrl = self.clone();
        thread::spawn(move || {
            thread::sleep(winder_common::consts::SECTION_COOLDOWN);
            let mut shared = ctrl.inner.shared.lock().unwrap();
            let next_size = shared.section.plan[ptr_after] as i64;
            shared.motion.goal_turns = shared.motion.turns_x as i64 + next_size;
            shared.motion.job = Job::Run;
            drop(shared);
            ctrl.set_motor_enable(Level::Low);
            info!(section = ptr_after, "goal reached: auto-advanced");
        });
    }

    /// Immediately pause and disable the motor, bypassing the grace
    /// period. Used by the engine host during shutdown.
    pub(crate) fn force_shutdown(&self) {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.motion.job = Job::Pause;
        drop(shared);
        self.set_motor_enable(Level::High);
    }

    /// Snapshot the current status (§6).
    pub fn snapshot(&self) -> StatusSnapshot {
        let endstop = match self.inner.port.read_input(Pin::YLimit) {
            Ok(Level::Low) => 1,
            _ => 0,
        };
        let real_turns = Some(self.inner.encoder.real_turns());

        let shared = self.inner.shared.lock().unwrap();
        let cfg = shared.config;
        let current_y = if cfg.y_steps_per_mm > 0.0 {
            Some(shared.motion.y_pos_steps as f64 / cfg.y_steps_per_mm)
        } else {
            None
        };
        let turns_per_layer = if cfg.pitch_mm > 0.0 {
            Some(cfg.bobbin_width_mm / cfg.pitch_mm)
        } else {
            None
        };

        StatusSnapshot {
            state: shared.motion.job,
            current_turns: shared.motion.turns_x,
            current_turns_real: real_turns,
            current_y,
            current_rpm: cfg.rpm,
            eff_w: cfg.bobbin_width_mm,
            turns_per_layer,
            endstop,
            sections_mode: shared.section.sections_mode,
            section_ptr: shared.section.ptr,
            section_plan_len: shared.section.plan.len(),
        }
    }
}
