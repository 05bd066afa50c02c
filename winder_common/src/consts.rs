//! Physical and kinematic constants shared across the workspace.

use std::time::Duration;

/// Encoder ticks per shaft revolution (fixed by the encoder hardware).
pub const ENC_TICKS_PER_REV: i64 = 18;

/// Minimum accepted spindle speed [rpm].
pub const RPM_MIN: u32 = 1;
/// Maximum accepted spindle speed [rpm].
pub const RPM_MAX: u32 = 5000;

/// Step pulse HIGH width.
pub const STEP_PULSE_WIDTH: Duration = Duration::from_micros(2);

/// Software debounce window for encoder edges.
pub const ENCODER_DEBOUNCE: Duration = Duration::from_millis(1);

/// Motion loop idle-gate sleep while `job != RUN`.
pub const PAUSE_GATE_SLEEP: Duration = Duration::from_millis(50);

/// Maximum pacing sleep per iteration while waiting for the next X deadline.
pub const PACE_SLEEP_CAP: Duration = Duration::from_millis(1);

/// Grace period between `stop()` and motor disable.
pub const STOP_GRACE: Duration = Duration::from_millis(120);

/// Cooldown between a finished section and an auto-advanced next one.
pub const SECTION_COOLDOWN: Duration = Duration::from_millis(300);

/// Startup default: X microsteps per spindle revolution.
pub const DEFAULT_X_STEPS_PER_REV: u32 = 6400;
/// Startup default: Y microsteps per millimeter.
pub const DEFAULT_Y_STEPS_PER_MM: f64 = 800.0;
/// Startup default: Y advance per X revolution (Y motion disabled).
pub const DEFAULT_PITCH_MM: f64 = 0.0;
/// Startup default: usable bobbin width.
pub const DEFAULT_BOBBIN_WIDTH_MM: f64 = 21.85;
/// Startup default: spindle speed.
pub const DEFAULT_RPM: u32 = 200;
/// Startup default: X direction sign.
pub const DEFAULT_X_DIR_SIGN: i8 = 1;

/// Minimum throttle interval between repeated hardware-fault log lines.
pub const HARDWARE_FAULT_LOG_INTERVAL: Duration = Duration::from_secs(60);
