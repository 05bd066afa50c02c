//! `GpioPort` trait — the hardware abstraction for the motion core (§4.2).
//!
//! HAL Core manages pins through this trait the same way the wider HAL
//! layer manages drivers through `HalDriver`: it enables pluggable
//! backends (a real BCM/sysfs port, a simulation port, a recording stub)
//! behind one interface. The motion loop only ever sees `GpioPort`.

use std::time::Duration;

use winder_common::error::WinderError;
use winder_common::pins::{EdgeKind, Level, Pin};

/// An edge callback registered on an input pin.
///
/// Invoked from whatever dispatches edges for the backend (an interrupt
/// thread, a polling loop). Must not block and must not panic.
pub type EdgeCallback = Box<dyn Fn() + Send + Sync>;

/// Hardware abstraction for the ten logical pins of the machine.
///
/// # Timing contract
///
/// `set_output`, `read_input` and `pulse` are called from the motion
/// loop's hot path and must be fast and non-blocking beyond `pulse`'s own
/// deliberate hold time. `attach_edge` is called once at startup.
pub trait GpioPort: Send + Sync {
    /// Drive `pin` to `level`.
    fn set_output(&self, pin: Pin, level: Level) -> Result<(), WinderError>;

    /// Read the current level of `pin`.
    fn read_input(&self, pin: Pin) -> Result<Level, WinderError>;

    /// Register an edge-triggered callback on `pin` for both interrupt
    /// and polling backends. Replaces any previously attached callback
    /// for the same `(pin, edge)` pair.
    fn attach_edge(&self, pin: Pin, edge: EdgeKind, callback: EdgeCallback)
    -> Result<(), WinderError>;

    /// Raise `pin`, hold for `width`, then lower it.
    ///
    /// Default implementation composes two `set_output` calls around a
    /// sleep; backends with cheaper native pulse support may override it.
    fn pulse(&self, pin: Pin, width: Duration) -> Result<(), WinderError> {
        self.set_output(pin, Level::High)?;
        std::thread::sleep(width);
        self.set_output(pin, Level::Low)
    }
}
