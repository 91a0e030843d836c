//! EC hardware adapter — bridges the register map to the domain port traits.
//!
//! Owns the handshake transport and, when available, the bulk register-file
//! reader, exposing them through [`SensorPort`] and [`ActuatorPort`]. This
//! is the only module that decides between the two sampling paths.

use log::{info, warn};

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::{BulkFailurePolicy, Config};
use crate::ec::bulk::BulkReader;
use crate::ec::registers::{REG_FAN_DUTY_SET, duty_raw, readings_from};
use crate::ec::transport::CMD_WRITE_FAN;
use crate::ec::{EcTransport, PortIo, ReadingSet};
use crate::error::Result;

pub struct EcHardware<P> {
    transport: EcTransport<P>,
    bulk: Option<BulkReader>,
    bulk_failure: BulkFailurePolicy,
    gpu_sensor: bool,
}

impl<P: PortIo> EcHardware<P> {
    pub fn new(transport: EcTransport<P>, bulk: Option<BulkReader>, config: &Config) -> Self {
        Self {
            transport,
            bulk,
            bulk_failure: config.bulk_failure,
            gpu_sensor: config.gpu_sensor,
        }
    }

    /// Build from acquired ports, opening the bulk path if configured.
    /// A missing bulk path only downgrades sampling to handshakes.
    pub fn from_config(io: P, config: &Config) -> Self {
        let bulk = if config.bulk_enabled {
            BulkReader::open(&config.bulk_path).ok()
        } else {
            None
        };
        Self::new(EcTransport::from_config(io, config), bulk, config)
    }

    fn sample_handshake(&mut self) -> ReadingSet {
        let gpu_sensor = self.gpu_sensor;
        let transport = &mut self.transport;
        readings_from(|offset| transport.read_register(offset), gpu_sensor)
    }

    pub fn transport(&self) -> &EcTransport<P> {
        &self.transport
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: PortIo> SensorPort for EcHardware<P> {
    fn sample(&mut self) -> Result<ReadingSet> {
        if let Some(reader) = self.bulk.as_mut() {
            match reader.read_block() {
                Ok(block) => return Ok(block.readings(self.gpu_sensor)),
                Err(e) if self.bulk_failure == BulkFailurePolicy::Abort => {
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(
                        "Bulk EC read from {} failed ({}), falling back to handshakes",
                        reader.path().display(),
                        e
                    );
                    self.bulk = None;
                }
            }
        }
        Ok(self.sample_handshake())
    }

    fn bulk_active(&self) -> bool {
        self.bulk.is_some()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: PortIo> ActuatorPort for EcHardware<P> {
    fn write_duty(&mut self, percent: u8) -> Result<()> {
        let raw = duty_raw(percent);
        info!("Set fan duty {}% (raw {})", percent, raw);
        self.transport
            .write_register(CMD_WRITE_FAN, REG_FAN_DUTY_SET, raw)
            .map_err(Into::into)
    }
}
