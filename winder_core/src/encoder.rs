//! Encoder edge monitor (§4.3). Counts signed quadrature ticks off
//! channel A's edges, debounced in software, sampling channel B for
//! direction only when needed.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

use winder_common::consts::{ENC_TICKS_PER_REV, ENCODER_DEBOUNCE};
use winder_common::error::WinderError;
use winder_common::pins::{EdgeKind, Level, Pin};
use winder_hal::GpioPort;

struct Inner {
    ticks: i64,
    prev_a: Level,
    last_edge: Option<Instant>,
}

/// Signed tick counter behind its own mutex, independent of the motion
/// mutex so encoder edges never contend with Controller operations.
pub struct EncoderMonitor {
    inner: Mutex<Inner>,
}

impl Default for EncoderMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderMonitor {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                ticks: 0,
                prev_a: Level::High,
                last_edge: None,
            }),
        }
    }

    /// Current signed tick count.
    pub fn ticks(&self) -> i64 {
        self.inner.lock().unwrap().ticks
    }

    /// Derived real turn count (`ticks / ENC_TICKS_PER_REV`).
    pub fn real_turns(&self) -> f64 {
        self.ticks() as f64 / ENC_TICKS_PER_REV as f64
    }

    /// Zero the counter. Called on a RUN transition from IDLE or on
    /// `start()`, never on `resume()`.
    pub fn reset(&self) {
        self.inner.lock().unwrap().ticks = 0;
    }

    /// Process one channel-A sample. `read_b` is only invoked on a falling
    /// edge, where direction is decided (§4.3: B HIGH at A's falling edge
    /// means -1, otherwise +1). Edges arriving within the debounce window
    /// of the last accepted edge are dropped entirely.
    pub fn on_sample(&self, a: Level, now: Instant, read_b: impl FnOnce() -> Level) {
        let mut inner = self.inner.lock().unwrap();
        if a == inner.prev_a {
            return;
        }
        if let Some(last) = inner.last_edge {
            if now.duration_since(last) < ENCODER_DEBOUNCE {
                return;
            }
        }
        inner.prev_a = a;
        inner.last_edge = Some(now);
        if a == Level::Low {
            let direction: i64 = if read_b() == Level::High { -1 } else { 1 };
            inner.ticks += direction;
        }
    }

    /// Attach the channel-A edge callback on `port`. The callback samples
    /// both channels and feeds [`EncoderMonitor::on_sample`]; it must
    /// never block or allocate beyond the one closure capture.
    pub fn install(self: &Arc<Self>, port: Arc<dyn GpioPort>) -> Result<(), WinderError> {
        let monitor = self.clone();
        let port_a = port.clone();
        port.attach_edge(
            Pin::EncA,
            EdgeKind::Both,
            Box::new(move || {
                let Ok(a) = port_a.read_input(Pin::EncA) else {
                    return;
                };
                let port_b = port_a.clone();
                monitor.on_sample(a, Instant::now(), move || {
                    port_b.read_input(Pin::EncB).unwrap_or(Level::High)
                });
            }),
        )
    }
}
