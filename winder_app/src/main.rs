//! # Winder App
//!
//! Process binary for the coil-winder motion engine: loads configuration,
//! spins up the real-time Motion Loop against a GPIO backend, and prints
//! periodic status to the console until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (no config file)
//! winder_app
//!
//! # Run with a config file and verbose logging
//! winder_app --config /etc/winder/winder.toml -v
//!
//! # JSON status lines instead of plain text
//! winder_app --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use winder_common::config::WinderConfig;
use winder_core::Engine;
use winder_hal::StubPort;

/// Winder App - coil-winder motion engine process binary
#[derive(Parser, Debug)]
#[command(name = "winder_app")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Real-time motion engine for a two-axis stepper coil winder")]
#[command(long_about = None)]
struct Args {
    /// Path to the engine configuration file (winder.toml); defaults are
    /// used if omitted or missing.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output status and logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Interval between console status lines, in milliseconds.
    #[arg(long, default_value_t = 500)]
    status_interval_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("winder_app startup failed: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    info!("winder_app v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => WinderConfig::load(path)?,
        None => {
            info!("no --config given, using startup defaults");
            WinderConfig::default()
        }
    };

    let port = Arc::new(StubPort::new());
    let engine = Engine::new(port, config);

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = running.clone();
    ctrlc::set_handler(move || {
        info!("received shutdown signal");
        running_for_handler.store(false, Ordering::SeqCst);
    })?;

    let controller = engine.controller().clone();
    while running.load(Ordering::SeqCst) {
        let snapshot = controller.snapshot();
        if args.json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            println!("{snapshot}");
        }
        std::thread::sleep(Duration::from_millis(args.status_interval_ms));
    }

    engine.shutdown();
    info!("winder_app shutdown complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
