//! Port traits — the boundary between the duty logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FanService (domain)
//! ```
//!
//! The EC hardware adapter implements [`SensorPort`] and [`ActuatorPort`];
//! tests substitute a recording mock. [`FanService`](super::service::FanService)
//! consumes them via generics, so the domain core never touches ports 0x62/0x66.

use crate::ec::ReadingSet;
use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
pub trait SensorPort {
    /// Take a fresh sample of every register in the map.
    ///
    /// An `Err` here is fatal to the worker; recoverable hiccups (handshake
    /// timeouts, a bulk read that fell back) are absorbed by the adapter.
    fn sample(&mut self) -> Result<ReadingSet>;

    /// Whether samples currently come from the bulk side channel.
    fn bulk_active(&self) -> bool {
        false
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the fan.
pub trait ActuatorPort {
    /// Set the fan duty (percent). `Err(Error::Transport)` means the
    /// controller did not confirm the write in time.
    fn write_duty(&mut self, percent: u8) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for event timestamps.
pub trait ClockPort {
    /// Seconds since the Unix epoch.
    fn unix_time(&self) -> u64;
}
