//! Engine host (ambient): owns the Controller, the background Motion Loop
//! thread and its lifecycle. Mirrors the process-binary wiring pattern
//! the HAL layer uses for its own driver threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::info;
use winder_common::config::WinderConfig;
use winder_hal::GpioPort;

use crate::controller::Controller;
use crate::motion::MotionLoop;

const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Engine {
    controller: Controller,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new(port: Arc<dyn GpioPort>, config: WinderConfig) -> Self {
        let controller = Controller::new(port, config);
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let controller = controller.clone();
            let running = running.clone();
            std::thread::Builder::new()
                .name("motion-loop".into())
                .spawn(move || {
                    let mut loop_ = MotionLoop::new(controller);
                    while running.load(Ordering::Relaxed) {
                        loop_.tick();
                    }
                })
                .expect("failed to spawn motion loop thread")
        };

        Self {
            controller,
            running,
            handle: Some(handle),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Stop the background loop, pause and disable the motor, and join
    /// the thread with a best-effort timeout.
    pub fn shutdown(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let start = Instant::now();
            loop {
                if handle.is_finished() {
                    let _ = handle.join();
                    break;
                }
                if start.elapsed() >= SHUTDOWN_JOIN_TIMEOUT {
                    info!("motion loop did not stop within the shutdown timeout");
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        self.controller.force_shutdown();
    }
}
