//! ecfan — Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │   EcHardware (Sensor+Actuator)  LogEventSink  SystemClock│
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │          Worker ─▶ FanService (override · auto-duty)     │
//! │                         │                                │
//! │                 SharedStateBlock ◀── presentation layer  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Modes:
//! - `ecfan` without `DISPLAY`: print the fan and temperature registers once.
//! - `ecfan` with `DISPLAY`: run the worker in the foreground with the
//!   shared block at `/dev/shm/ecfan`; Ctrl-C stops it.
//! - `ecfan <duty>`: set a manual duty (60–100 %) once, then print.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use ecfan::adapters::hardware::EcHardware;
use ecfan::adapters::log_sink::LogEventSink;
use ecfan::adapters::time::SystemClock;
use ecfan::app::commands::ManualDuty;
use ecfan::app::ports::{ActuatorPort, SensorPort};
use ecfan::config::Config;
use ecfan::ec::{PortIo, RawPortIo};
use ecfan::shared::{SHM_PATH, SharedState};
use ecfan::worker::Worker;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("ecfan v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let config = match std::env::var_os("ECFAN_CONFIG") {
        Some(path) => Config::load(Path::new(&path)).context("loading ECFAN_CONFIG")?,
        None => Config::default(),
    };

    // ── 2. Manual duty argument is validated before touching ports ──
    let manual = match std::env::args().nth(1) {
        Some(arg) => {
            let value: i64 = arg
                .trim()
                .parse()
                .with_context(|| format!("invalid fan duty {arg:?}"))?;
            let Ok(duty) = ManualDuty::try_from(value) else {
                bail!("invalid fan duty {value}! (accepted: 60-100)");
            };
            Some(duty)
        }
        None => None,
    };

    // ── 3. Port acquisition (fatal on failure) ────────────────
    let io = RawPortIo::acquire().context("acquiring EC ports")?;
    let mut hw = EcHardware::from_config(io, &config);

    // ── 4. Dispatch ───────────────────────────────────────────
    if let Some(duty) = manual {
        info!("Test fan {}%", duty.percent());
        if let Err(e) = hw.write_duty(duty.percent()) {
            warn!("{}", e);
        }
        return dump(&mut hw);
    }

    let has_display = std::env::var_os("DISPLAY").is_some_and(|d| !d.is_empty());
    if !has_display {
        return dump(&mut hw);
    }

    run_worker(hw, &config)
}

/// Print the fan and temperature registers once.
fn dump<P: PortIo>(hw: &mut EcHardware<P>) -> Result<()> {
    let r = hw.sample().context("sampling EC")?;
    println!("FAN Duty: {}%", r.fan_duty_percent);
    println!("FAN RPMs: {} RPM", r.fan_rpm);
    println!("CPU Temp: {}\u{00b0}C", r.cpu_temp);
    if let Some(gpu) = r.gpu_temp {
        println!("GPU Temp: {}\u{00b0}C", gpu);
    }
    Ok(())
}

/// Foreground worker with the block published for a presentation peer.
fn run_worker<P: PortIo + Send + 'static>(hw: EcHardware<P>, config: &Config) -> Result<()> {
    let shm = PathBuf::from(SHM_PATH);
    let shared = Arc::new(SharedState::create(&shm).context("creating shared state block")?);

    let signal_peer = Arc::clone(&shared);
    ctrlc::set_handler(move || signal_peer.request_exit())
        .context("installing Ctrl-C handler")?;

    info!(
        "Worker running; shutdown within {} ms of Ctrl-C",
        config.shutdown_bound_ms()
    );
    let worker = Worker::from_config(hw, LogEventSink::new(), SystemClock::new(), shared, config);
    let handle = worker.spawn().context("spawning worker thread")?;
    let result = match handle.join() {
        Ok(result) => result.map(|_| ()).map_err(anyhow::Error::from),
        Err(_) => Err(anyhow::anyhow!("worker thread panicked")),
    };

    if let Err(e) = std::fs::remove_file(&shm) {
        warn!("Could not remove {}: {}", shm.display(), e);
    }
    result
}
