//! Winder Core
//!
//! The real-time motion engine for a two-axis stepper coil winder:
//! kinematics, encoder monitoring, the timed motion loop and the
//! Controller operation surface that drives them.
//!
//! # Module Structure
//!
//! - [`kinematics`] — pure X/Y coupling and step-timing calculator
//! - [`encoder`] — debounced quadrature tick counter
//! - [`state`] — motion state, job lifecycle and section-plan types
//! - [`fault`] — throttled hardware-fault logging
//! - [`motion`] — the timed Motion Loop worker
//! - [`controller`] — the operation surface (setters, run/stop/resume, goal)
//! - [`snapshot`] — point-in-time status, serializable for `--json`
//! - [`engine`] — background-thread lifecycle wiring

pub mod controller;
pub mod encoder;
pub mod engine;
pub mod fault;
pub mod kinematics;
pub mod motion;
pub mod snapshot;
pub mod state;

pub use controller::Controller;
pub use engine::Engine;
pub use motion::{MotionLoop, TickOutcome};
pub use snapshot::StatusSnapshot;
pub use state::Job;
