//! Winder HAL
//!
//! Defines the [`GpioPort`] trait — the hardware abstraction the motion
//! core drives — and a [`stub::StubPort`] backend for hosts without real
//! GPIO hardware (tests, dev machines, CI).
//!
//! # Module Structure
//!
//! - [`port`] — the `GpioPort` trait and its default `pulse` behavior
//! - [`stub`] — a recording, no-op-hardware implementation

pub mod port;
pub mod stub;

pub use port::GpioPort;
pub use stub::StubPort;
