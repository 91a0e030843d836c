//! Mock hardware for integration tests.
//!
//! [`SimEc`] emulates the controller behind ports 0x62/0x66 closely enough
//! for the real transport to talk to it. [`MockFan`] sits one layer up, at
//! the port traits, with the duty following every write.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ecfan::app::events::AppEvent;
use ecfan::app::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use ecfan::ec::PortIo;
use ecfan::ec::ReadingSet;
use ecfan::ec::registers::{REG_CPU_TEMP, REG_FAN_DUTY, REG_FAN_DUTY_SET};
use ecfan::ec::transport::{CMD_READ, CMD_WRITE_FAN};
use ecfan::ec::{EC_DATA, EC_SC};
use ecfan::error::{Error, Result, TransportTimeout};

// ── Simulated EC ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    ReadOffset,
    WriteOffset,
    WriteValue(u8),
}

/// Register file plus the handshake state machine.
pub struct SimEc {
    pub regs: [u8; 256],
    /// Completed vendor writes as `(offset, value)`.
    pub writes: Vec<(u8, u8)>,
    /// Hold IBF high forever.
    pub wedged: bool,
    /// CPU temperatures served by successive reads of the CPU register.
    pub cpu_script: VecDeque<u8>,
    phase: Phase,
    data: u8,
    obf: bool,
}

impl SimEc {
    pub fn new() -> Self {
        Self {
            regs: [0; 256],
            writes: Vec::new(),
            wedged: false,
            cpu_script: VecDeque::new(),
            phase: Phase::Idle,
            data: 0,
            obf: false,
        }
    }

    /// Register file with a known snapshot:
    /// CPU 45 °C, GPU 50 °C, duty 204 (80 %), tach 0x0250.
    pub fn with_snapshot() -> Self {
        let mut ec = Self::new();
        ec.regs[0x07] = 45;
        ec.regs[0xCD] = 50;
        ec.regs[0xCE] = 204;
        ec.regs[0xD0] = 0x02;
        ec.regs[0xD1] = 0x50;
        ec
    }
}

impl Default for SimEc {
    fn default() -> Self {
        Self::new()
    }
}

impl PortIo for SimEc {
    fn inb(&mut self, port: u16) -> u8 {
        match port {
            EC_SC => u8::from(self.obf) | if self.wedged { 0x02 } else { 0x00 },
            EC_DATA => {
                self.obf = false;
                self.data
            }
            _ => 0xFF,
        }
    }

    fn outb(&mut self, port: u16, value: u8) {
        match (port, self.phase) {
            (EC_SC, _) if value == CMD_READ => self.phase = Phase::ReadOffset,
            (EC_SC, _) if value == CMD_WRITE_FAN => self.phase = Phase::WriteOffset,
            (EC_DATA, Phase::ReadOffset) => {
                if value == REG_CPU_TEMP {
                    if let Some(t) = self.cpu_script.pop_front() {
                        self.regs[usize::from(REG_CPU_TEMP)] = t;
                    }
                }
                self.data = self.regs[usize::from(value)];
                self.obf = true;
                self.phase = Phase::Idle;
            }
            (EC_DATA, Phase::WriteOffset) => self.phase = Phase::WriteValue(value),
            (EC_DATA, Phase::WriteValue(offset)) => {
                if offset == REG_FAN_DUTY_SET {
                    self.regs[usize::from(REG_FAN_DUTY)] = value;
                }
                self.writes.push((offset, value));
                self.phase = Phase::Idle;
            }
            _ => self.phase = Phase::Idle,
        }
    }
}

// ── MockFan ───────────────────────────────────────────────────

/// Port-level fan: duty follows writes, temperature is fixed at creation.
pub struct MockFan {
    pub readings: ReadingSet,
    /// Fail every write with a handshake timeout.
    pub unconfirmed: bool,
    /// Fail every sample with this error.
    pub sample_error: Option<Error>,
}

impl MockFan {
    pub fn new(cpu_temp: u8, duty: u8) -> Self {
        Self {
            readings: ReadingSet {
                cpu_temp,
                gpu_temp: None,
                fan_duty_percent: duty,
                fan_rpm: 3000,
            },
            unconfirmed: false,
            sample_error: None,
        }
    }
}

impl SensorPort for MockFan {
    fn sample(&mut self) -> Result<ReadingSet> {
        match self.sample_error {
            Some(e) => Err(e),
            None => Ok(self.readings),
        }
    }
}

impl ActuatorPort for MockFan {
    fn write_duty(&mut self, percent: u8) -> Result<()> {
        self.readings.fan_duty_percent = percent;
        if self.unconfirmed {
            return Err(Error::Transport(TransportTimeout {
                port: EC_SC,
                observed: 0x02,
                flag: 1,
                expected: false,
            }));
        }
        Ok(())
    }
}

// ── Recording sink and fixed clock ────────────────────────────

/// Event sink that can be handed to a worker thread and inspected after.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Arc<Mutex<Vec<AppEvent>>>);

impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        if let Ok(mut v) = self.0.lock() {
            v.push(event.clone());
        }
    }
}

#[derive(Clone, Copy)]
pub struct FixedClock(pub u64);

impl ClockPort for FixedClock {
    fn unix_time(&self) -> u64 {
        self.0
    }
}
