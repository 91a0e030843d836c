//! EC register handshake protocol.
//!
//! The controller gates every byte on two status bits: IBF (input buffer
//! full, bit 1) and OBF (output buffer full, bit 0). Never write while IBF
//! is set; never read the data port before OBF is set.
//!
//! Waits are bounded by a monotonic deadline. A timeout is logged with the
//! full diagnostic and the sequence carries on: a wedged controller costs a
//! stale byte, never a hung worker.
//!
//! The protocol assumes exclusive use of both ports by this process.

use std::thread;
use std::time::{Duration, Instant};

use log::warn;

use super::port_io::PortIo;
use super::{EC_DATA, EC_SC};
use crate::config::Config;
use crate::error::TransportTimeout;

/// Output buffer full.
pub const OBF: u8 = 0;
/// Input buffer full.
pub const IBF: u8 = 1;

/// Read-register command.
pub const CMD_READ: u8 = 0x80;
/// Vendor command for fan-duty writes.
pub const CMD_WRITE_FAN: u8 = 0x99;

pub struct EcTransport<P> {
    io: P,
    poll_interval: Duration,
    timeout: Duration,
}

impl<P: PortIo> EcTransport<P> {
    pub fn new(io: P, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            io,
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(io: P, config: &Config) -> Self {
        Self::new(
            io,
            Duration::from_micros(u64::from(config.poll_interval_us)),
            Duration::from_millis(u64::from(config.handshake_timeout_ms)),
        )
    }

    /// Poll the status port until bit `flag` equals `expected`.
    pub fn wait_for_flag(&mut self, flag: u8, expected: bool) -> Result<(), TransportTimeout> {
        let deadline = Instant::now() + self.timeout;
        let mut status = self.io.inb(EC_SC);
        loop {
            if (status >> flag) & 1 == u8::from(expected) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                let err = TransportTimeout {
                    port: EC_SC,
                    observed: status,
                    flag,
                    expected,
                };
                warn!("{err}");
                return Err(err);
            }
            thread::sleep(self.poll_interval);
            status = self.io.inb(EC_SC);
        }
    }

    /// Read one register. Timeouts are logged; the byte may be stale.
    pub fn read_register(&mut self, offset: u8) -> u8 {
        let _ = self.wait_for_flag(IBF, false);
        self.io.outb(EC_SC, CMD_READ);

        let _ = self.wait_for_flag(IBF, false);
        self.io.outb(EC_DATA, offset);

        let _ = self.wait_for_flag(OBF, true);
        self.io.inb(EC_DATA)
    }

    /// Issue `opcode` with `offset` and `value`.
    ///
    /// Only the final wait (the controller consuming `value`) decides the
    /// result; earlier timeouts are logged and the sequence continues.
    pub fn write_register(
        &mut self,
        opcode: u8,
        offset: u8,
        value: u8,
    ) -> Result<(), TransportTimeout> {
        let _ = self.wait_for_flag(IBF, false);
        self.io.outb(EC_SC, opcode);

        let _ = self.wait_for_flag(IBF, false);
        self.io.outb(EC_DATA, offset);

        let _ = self.wait_for_flag(IBF, false);
        self.io.outb(EC_DATA, value);

        self.wait_for_flag(IBF, false)
    }

    pub fn io(&self) -> &P {
        &self.io
    }
}
