//! Throttled hardware-fault logging (§4.4, §7 ambient logging).
//!
//! GPIO errors are never propagated out of the motion loop; they are
//! logged at most once per [`HARDWARE_FAULT_LOG_INTERVAL`] and otherwise
//! silently swallowed so a flaky pin can't flood the log.

use std::sync::Mutex;
use std::time::Instant;

use tracing::warn;
use winder_common::consts::HARDWARE_FAULT_LOG_INTERVAL;
use winder_common::error::WinderError;

pub struct FaultLog {
    last: Mutex<Option<Instant>>,
}

impl Default for FaultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultLog {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Report `err`, logging only if the interval has elapsed since the
    /// last reported fault.
    pub fn report(&self, err: &WinderError) {
        let mut last = self.last.lock().unwrap();
        let now = Instant::now();
        let should_log = match *last {
            None => true,
            Some(prev) => now.duration_since(prev) >= HARDWARE_FAULT_LOG_INTERVAL,
        };
        if should_log {
            warn!(error = %err, "hardware I/O fault");
            *last = Some(now);
        }
    }
}
