//! `StubPort` — a no-op-hardware `GpioPort` for hosts without GPIO.
//!
//! Level writes and pulses are recorded rather than driven onto silicon;
//! reads return a configurable level that a test harness can flip to
//! simulate a limit switch engaging or an encoder edge arriving. The rest
//! of the core functions unchanged against this backend (§4.2).

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::trace;
use winder_common::error::WinderError;
use winder_common::pins::{EdgeKind, Level, Pin};

use crate::port::{EdgeCallback, GpioPort};

struct Callback {
    edge: EdgeKind,
    f: EdgeCallback,
}

/// Recording GPIO stub. All state is behind independent small mutexes so
/// `set_output`/`read_input` never contend with each other across pins.
pub struct StubPort {
    outputs: Mutex<HashMap<Pin, Level>>,
    inputs: Mutex<HashMap<Pin, Level>>,
    pulse_counts: Mutex<HashMap<Pin, u64>>,
    callbacks: Mutex<HashMap<Pin, Vec<Callback>>>,
}

impl Default for StubPort {
    fn default() -> Self {
        Self::new()
    }
}

impl StubPort {
    /// Construct a stub with the startup initial state (§4.2): all
    /// outputs LOW, MOTOR_ENABLE HIGH (disabled), inputs pulled up (not
    /// engaged / idle).
    pub fn new() -> Self {
        let mut outputs = HashMap::new();
        for pin in Pin::ALL {
            if !pin.is_input() {
                outputs.insert(pin, Level::Low);
            }
        }
        outputs.insert(Pin::MotorEnable, Level::High);

        let mut inputs = HashMap::new();
        for pin in Pin::ALL {
            if pin.is_input() {
                inputs.insert(pin, Level::High);
            }
        }

        Self {
            outputs: Mutex::new(outputs),
            inputs: Mutex::new(inputs),
            pulse_counts: Mutex::new(HashMap::new()),
            callbacks: Mutex::new(HashMap::new()),
        }
    }

    /// Current recorded output level (test/diagnostic accessor).
    pub fn output_level(&self, pin: Pin) -> Level {
        *self.outputs.lock().unwrap().get(&pin).unwrap_or(&Level::Low)
    }

    /// Number of completed pulses observed on `pin`.
    pub fn pulse_count(&self, pin: Pin) -> u64 {
        *self.pulse_counts.lock().unwrap().get(&pin).unwrap_or(&0)
    }

    /// Drive an input pin to a new level from a test harness, firing any
    /// attached edge callback whose `EdgeKind` matches the transition.
    pub fn set_input_for_test(&self, pin: Pin, level: Level) {
        let changed = {
            let mut inputs = self.inputs.lock().unwrap();
            let prev = inputs.insert(pin, level).unwrap_or(level);
            prev != level
        };
        if !changed {
            return;
        }
        let rising = level.is_high();
        let callbacks = self.callbacks.lock().unwrap();
        if let Some(list) = callbacks.get(&pin) {
            for cb in list {
                let matches = match cb.edge {
                    EdgeKind::Both => true,
                    EdgeKind::Rising => rising,
                    EdgeKind::Falling => !rising,
                };
                if matches {
                    (cb.f)();
                }
            }
        }
    }
}

impl GpioPort for StubPort {
    fn set_output(&self, pin: Pin, level: Level) -> Result<(), WinderError> {
        self.outputs.lock().unwrap().insert(pin, level);
        Ok(())
    }

    fn read_input(&self, pin: Pin) -> Result<Level, WinderError> {
        Ok(*self.inputs.lock().unwrap().get(&pin).unwrap_or(&Level::High))
    }

    fn attach_edge(
        &self,
        pin: Pin,
        edge: EdgeKind,
        callback: EdgeCallback,
    ) -> Result<(), WinderError> {
        trace!(?pin, ?edge, "attaching edge callback");
        self.callbacks
            .lock()
            .unwrap()
            .entry(pin)
            .or_default()
            .push(Callback { edge, f: callback });
        Ok(())
    }

    fn pulse(&self, pin: Pin, width: std::time::Duration) -> Result<(), WinderError> {
        self.set_output(pin, Level::High)?;
        std::thread::sleep(width);
        self.set_output(pin, Level::Low)?;
        *self.pulse_counts.lock().unwrap().entry(pin).or_insert(0) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn initial_state_matches_spec() {
        let port = StubPort::new();
        assert_eq!(port.output_level(Pin::XStep), Level::Low);
        assert_eq!(port.output_level(Pin::MotorEnable), Level::High);
        assert_eq!(port.read_input(Pin::YLimit).unwrap(), Level::High);
    }

    #[test]
    fn pulse_is_recorded() {
        let port = StubPort::new();
        port.pulse(Pin::XStep, std::time::Duration::from_micros(2))
            .unwrap();
        assert_eq!(port.pulse_count(Pin::XStep), 1);
        assert_eq!(port.output_level(Pin::XStep), Level::Low);
    }

    #[test]
    fn edge_callback_fires_on_matching_transition() {
        let port = StubPort::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        port.attach_edge(
            Pin::EncA,
            EdgeKind::Falling,
            Box::new(move || {
                count2.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        port.set_input_for_test(Pin::EncA, Level::Low);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Rising edge does not fire a Falling-only callback.
        port.set_input_for_test(Pin::EncA, Level::High);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        port.set_input_for_test(Pin::EncA, Level::Low);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn no_change_does_not_refire() {
        let port = StubPort::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        port.attach_edge(
            Pin::YLimit,
            EdgeKind::Both,
            Box::new(move || {
                count2.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        port.set_input_for_test(Pin::YLimit, Level::High); // already High
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
