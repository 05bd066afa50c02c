//! Status snapshot (§6): a point-in-time read of the engine, serializable
//! for `--json` CLI output and printable for the plain console line.

use std::fmt;

use serde::Serialize;

use crate::state::Job;

/// A consistent point-in-time read of the engine. Nothing here is live;
/// it is a copy taken under the motion mutex plus a couple of
/// independent, lock-free reads (encoder ticks, the Y-limit pin).
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: Job,
    pub current_turns: u64,
    pub current_turns_real: Option<f64>,
    pub current_y: Option<f64>,
    pub current_rpm: u32,
    pub eff_w: f64,
    pub turns_per_layer: Option<f64>,
    /// 1 if the Y limit switch is currently engaged, else 0.
    pub endstop: u8,
    pub sections_mode: bool,
    pub section_ptr: usize,
    pub section_plan_len: usize,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} turns={}",
            self.state, self.current_turns
        )?;
        if let Some(real) = self.current_turns_real {
            write!(f, " real={real:.3}")?;
        }
        if let Some(y) = self.current_y {
            write!(f, " y={y:.3}mm")?;
        }
        write!(f, " rpm={}", self.current_rpm)?;
        if self.sections_mode {
            write!(
                f,
                " section={}/{}",
                self.section_ptr.min(self.section_plan_len),
                self.section_plan_len
            )?;
        }
        if self.endstop == 1 {
            write!(f, " [endstop]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_turns_and_rpm() {
        let snap = StatusSnapshot {
            state: Job::Run,
            current_turns: 12,
            current_turns_real: Some(11.94),
            current_y: Some(3.5),
            current_rpm: 200,
            eff_w: 21.85,
            turns_per_layer: None,
            endstop: 0,
            sections_mode: false,
            section_ptr: 0,
            section_plan_len: 0,
        };
        let text = format!("{snap}");
        assert!(text.contains("turns=12"));
        assert!(text.contains("rpm=200"));
        assert!(!text.contains("section="));
    }

    #[test]
    fn display_shows_section_progress() {
        let snap = StatusSnapshot {
            state: Job::Pause,
            current_turns: 4,
            current_turns_real: Some(4.0),
            current_y: None,
            current_rpm: 200,
            eff_w: 21.85,
            turns_per_layer: None,
            endstop: 1,
            sections_mode: true,
            section_ptr: 1,
            section_plan_len: 3,
        };
        let text = format!("{snap}");
        assert!(text.contains("section=1/3"));
        assert!(text.contains("[endstop]"));
    }
}
