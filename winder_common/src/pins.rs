//! Logical GPIO pin identifiers, levels and edge kinds.
//!
//! The motion core never talks to raw pin numbers; it addresses pins by
//! role through [`Pin`], leaving the mapping to physical BCM/header
//! numbers to the `winder_hal` backend in use.

/// Logical output/input level on a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    /// Level that would appear active-low, i.e. the inverse of `High`.
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    #[inline]
    pub const fn from_bool(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        Level::from_bool(high)
    }
}

/// Edge kinds an edge-triggered callback can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Rising,
    Falling,
    Both,
}

/// The ten logical pins of the machine (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    /// X step pulse (output).
    XStep,
    /// X direction (output).
    XDir,
    /// Y step pulse (output).
    YStep,
    /// Y direction (output).
    YDir,
    /// Stepper driver enable, active-low (output).
    MotorEnable,
    /// Y limit switch, pulled up, LOW when engaged (input).
    YLimit,
    /// Encoder channel A (input, edge-triggered).
    EncA,
    /// Encoder channel B (input).
    EncB,
}

impl Pin {
    /// All logical pins, in a stable order (useful for stub init).
    pub const ALL: [Pin; 8] = [
        Pin::XStep,
        Pin::XDir,
        Pin::YStep,
        Pin::YDir,
        Pin::MotorEnable,
        Pin::YLimit,
        Pin::EncA,
        Pin::EncB,
    ];

    /// Whether this pin is an input in normal operation.
    #[inline]
    pub const fn is_input(self) -> bool {
        matches!(self, Pin::YLimit | Pin::EncA | Pin::EncB)
    }
}
