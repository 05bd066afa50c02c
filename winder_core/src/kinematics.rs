//! Pure kinematics calculator (§4.1). No I/O, no locking: derives the
//! per-X-step Y increment and the X step timing from a config snapshot.

use std::time::Duration;

use winder_common::config::WinderConfig;

/// Quantities the motion loop needs for one iteration, derived fresh from
/// the current configuration. Cheap enough to recompute every tick rather
/// than cache and invalidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Y microsteps per full X revolution.
    pub y_steps_per_turn: f64,
    /// Y microsteps carried per X step (may be fractional, accumulated in
    /// `MotionState::y_acc`).
    pub y_step_per_xstep: f64,
    /// Time between successive X step pulses at the configured rpm.
    pub x_interval: Duration,
}

impl Kinematics {
    /// Derive from a configuration snapshot. `x_steps_per_rev == 0` yields
    /// no Y coupling rather than a division panic, though `WinderConfig`
    /// validation never allows that in practice.
    pub fn compute(cfg: &WinderConfig) -> Self {
        let y_steps_per_turn = cfg.y_steps_per_mm * cfg.pitch_mm;
        let y_step_per_xstep = if cfg.x_steps_per_rev > 0 {
            y_steps_per_turn / cfg.x_steps_per_rev as f64
        } else {
            0.0
        };

        let steps_per_sec = (cfg.rpm as f64 * cfg.x_steps_per_rev as f64) / 60.0;
        let steps_per_sec = steps_per_sec.max(1.0);
        let x_interval = Duration::from_secs_f64(1.0 / steps_per_sec);

        Self {
            y_steps_per_turn,
            y_step_per_xstep,
            x_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_zero_disables_y_coupling() {
        let cfg = WinderConfig {
            pitch_mm: 0.0,
            ..WinderConfig::default()
        };
        let k = Kinematics::compute(&cfg);
        assert_eq!(k.y_step_per_xstep, 0.0);
    }

    #[test]
    fn x_interval_matches_rpm() {
        let cfg = WinderConfig {
            x_steps_per_rev: 200,
            rpm: 60,
            ..WinderConfig::default()
        };
        let k = Kinematics::compute(&cfg);
        // 200 steps/rev * 1 rev/s = 200 steps/s -> 5ms/step
        assert!((k.x_interval.as_secs_f64() - 0.005).abs() < 1e-9);
    }

    #[test]
    fn x_interval_floors_at_one_hertz() {
        let cfg = WinderConfig {
            x_steps_per_rev: 1,
            rpm: 1,
            ..WinderConfig::default()
        };
        let k = Kinematics::compute(&cfg);
        // 1 * 1 / 60 steps/s is below the 1Hz floor.
        assert!((k.x_interval.as_secs_f64() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn y_step_per_xstep_matches_pitch() {
        let cfg = WinderConfig {
            x_steps_per_rev: 100,
            y_steps_per_mm: 10.0,
            pitch_mm: 1.0,
            ..WinderConfig::default()
        };
        let k = Kinematics::compute(&cfg);
        assert_eq!(k.y_steps_per_turn, 10.0);
        assert_eq!(k.y_step_per_xstep, 0.1);
    }
}
