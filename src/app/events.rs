//! Outbound application events.
//!
//! [`FanService`](super::service::FanService) emits these through the
//! [`EventSink`](super::ports::EventSink) port; the log sink turns them into
//! console lines.

use crate::ec::ReadingSet;

/// Who decided a duty change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutySource {
    Auto,
    Manual,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The worker started; `bulk` tells which sampling path is in use.
    Started { bulk: bool },

    /// A new duty was written to the EC.
    DutyApplied {
        timestamp: u64,
        cpu_temp: u8,
        gpu_temp: Option<u8>,
        duty: u8,
        source: DutySource,
    },

    /// The EC did not confirm a duty write within the handshake deadline.
    WriteUnconfirmed { duty: u8 },

    /// The bulk side channel failed and sampling fell back to handshakes.
    BulkFallback,

    /// The worker returned after observing the exit flag.
    Stopped { cycles: u64 },
}

impl AppEvent {
    pub(crate) fn duty_applied(
        timestamp: u64,
        readings: &ReadingSet,
        duty: u8,
        source: DutySource,
    ) -> Self {
        Self::DutyApplied {
            timestamp,
            cpu_temp: readings.cpu_temp,
            gpu_temp: readings.gpu_temp,
            duty,
            source,
        }
    }
}
