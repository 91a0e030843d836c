//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events through
//! the `log` facade (stderr via `env_logger` in the binary). A tray or
//! D-Bus front end would implement the same trait.

use log::{info, warn};

use crate::app::events::{AppEvent, DutySource};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { bulk } => {
                info!("START | sampling={}", if *bulk { "bulk" } else { "handshake" });
            }
            AppEvent::DutyApplied {
                timestamp,
                cpu_temp,
                gpu_temp,
                duty,
                source,
            } => {
                let source = match source {
                    DutySource::Auto => "auto",
                    DutySource::Manual => "manual",
                };
                match gpu_temp {
                    Some(gpu) => info!(
                        "DUTY  | t={} | CPU={}\u{00b0}C GPU={}\u{00b0}C | fan={}% ({})",
                        timestamp, cpu_temp, gpu, duty, source
                    ),
                    None => info!(
                        "DUTY  | t={} | CPU={}\u{00b0}C | fan={}% ({})",
                        timestamp, cpu_temp, duty, source
                    ),
                }
            }
            AppEvent::WriteUnconfirmed { duty } => {
                warn!("DUTY  | write of {}% not confirmed by EC", duty);
            }
            AppEvent::BulkFallback => {
                warn!("BULK  | register file lost, using handshakes");
            }
            AppEvent::Stopped { cycles } => {
                info!("STOP  | cycles={}", cycles);
            }
        }
    }
}
