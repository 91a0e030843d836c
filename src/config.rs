//! Runtime configuration.
//!
//! Every tunable of the controller. Defaults match the Clevo EC; a JSON file
//! can override them (the binary reads its path from `ECFAN_CONFIG`).
//! Fan mode and manual duty are deliberately not part of this struct: they
//! are never persisted across runs.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What the worker does when the bulk register-file read fails mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkFailurePolicy {
    /// Drop the side channel and continue with per-register handshakes.
    Fallback,
    /// Stop the worker and raise the exit flag.
    Abort,
}

/// Core controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // --- Timing ---
    /// Worker sampling interval (milliseconds).
    pub sample_interval_ms: u32,
    /// Sleep between status-port polls (microseconds).
    pub poll_interval_us: u32,
    /// Deadline for a single handshake wait (milliseconds).
    pub handshake_timeout_ms: u32,

    // --- Bulk read path ---
    /// debugfs exposure of the EC register file.
    pub bulk_path: PathBuf,
    /// Whether to try the bulk path at all.
    pub bulk_enabled: bool,
    pub bulk_failure: BulkFailurePolicy,

    // --- Sensors ---
    /// Read the GPU temperature register (not wired on every model).
    pub gpu_sensor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Timing
            sample_interval_ms: 500,
            poll_interval_us: 1000,
            handshake_timeout_ms: 100,

            // Bulk
            bulk_path: PathBuf::from("/sys/kernel/debug/ec/ec0/io"),
            bulk_enabled: true,
            bulk_failure: BulkFailurePolicy::Fallback,

            // Sensors
            gpu_sensor: true,
        }
    }
}

impl Config {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|_| Error::Config("config file unreadable"))?;
        let cfg: Self =
            serde_json::from_str(&text).map_err(|_| Error::Config("config file is not valid JSON"))?;
        cfg.validate()?;
        info!("Config loaded from {}", path.display());
        Ok(cfg)
    }

    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<()> {
        if !(100..=5000).contains(&self.sample_interval_ms) {
            return Err(Error::Config("sample_interval_ms must be 100-5000"));
        }
        if !(100..=10_000).contains(&self.poll_interval_us) {
            return Err(Error::Config("poll_interval_us must be 100-10000"));
        }
        if !(10..=1000).contains(&self.handshake_timeout_ms) {
            return Err(Error::Config("handshake_timeout_ms must be 10-1000"));
        }
        if u64::from(self.poll_interval_us) >= u64::from(self.handshake_timeout_ms) * 1000 {
            return Err(Error::Config(
                "poll_interval_us must be shorter than handshake_timeout_ms",
            ));
        }
        if self.bulk_enabled && self.bulk_path.as_os_str().is_empty() {
            return Err(Error::Config("bulk_path must be set when bulk_enabled"));
        }
        Ok(())
    }

    /// Worst-case time from raising the exit flag to the worker returning.
    pub fn shutdown_bound_ms(&self) -> u64 {
        // Up to four waits for each of the five handshaked registers.
        u64::from(self.sample_interval_ms) + u64::from(self.handshake_timeout_ms) * 4 * 5
    }
}
