//! Crate-wide error taxonomy for the coil-winder motion engine (§7).
//!
//! Four kinds, matching the propagation policy in the specification:
//! `Validation` and `Precondition` are rejected synchronously with state
//! left untouched; `HardwareIo` is logged and swallowed inside the motion
//! loop; `Fatal` means the loop itself has died.

use thiserror::Error;

/// Errors surfaced by the Controller operation set and the motion loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WinderError {
    /// Caller passed a non-positive or otherwise out-of-range value.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation's precondition was not met (e.g. `start(total=0)`).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// GPIO write/read failed. Never propagated out of the motion loop;
    /// logged at a throttled rate instead.
    #[error("hardware I/O error on {pin}: {detail}")]
    HardwareIo {
        /// Logical pin name, for the log line.
        pin: &'static str,
        /// Backend-reported detail.
        detail: String,
    },

    /// The motion loop thread has terminated unexpectedly.
    #[error("motion loop is no longer running")]
    Fatal,
}

/// Result type for Controller operations.
pub type WinderResult<T> = Result<T, WinderError>;
