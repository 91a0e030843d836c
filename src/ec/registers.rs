//! Clevo EC register map and unit conversions.
//!
//! The same offset table serves both sampling paths: one handshake per
//! register, or indexing into a bulk [`RegisterBlock`]. Conversions are pure
//! and integer-only.

use crate::error::BulkReadError;

/// CPU temperature, °C.
pub const REG_CPU_TEMP: u8 = 0x07;
/// GPU temperature, °C (not wired on every model).
pub const REG_GPU_TEMP: u8 = 0xCD;
/// Current fan duty, 0–255.
pub const REG_FAN_DUTY: u8 = 0xCE;
/// Fan tachometer period, high byte.
pub const REG_FAN_RPM_HI: u8 = 0xD0;
/// Fan tachometer period, low byte.
pub const REG_FAN_RPM_LO: u8 = 0xD1;
/// Target of the fan-duty write command.
pub const REG_FAN_DUTY_SET: u8 = 0x01;

/// Tachometer constant: RPM = K / period.
pub const RPM_CONSTANT: u32 = 2_156_220;

/// Size of the EC register file.
pub const REGISTER_FILE_LEN: usize = 256;

/// Raw duty byte → percent, truncated.
pub const fn duty_percent(raw: u8) -> u8 {
    (raw as u16 * 100 / 255) as u8
}

/// Percent → raw duty byte, truncated. Values above 100 saturate.
pub const fn duty_raw(percent: u8) -> u8 {
    let p = if percent > 100 { 100 } else { percent };
    (p as u16 * 255 / 100) as u8
}

/// Combine the two tachometer bytes.
pub const fn rpm_count(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

/// Tachometer period → RPM. A stopped fan reports a zero period.
pub const fn rpm(count: u16) -> u32 {
    if count == 0 {
        0
    } else {
        RPM_CONSTANT / count as u32
    }
}

/// One sample of the fan and thermal registers in engineering units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingSet {
    pub cpu_temp: u8,
    pub gpu_temp: Option<u8>,
    pub fan_duty_percent: u8,
    pub fan_rpm: u32,
}

impl ReadingSet {
    /// Hotter of the two sensors; drives the auto-duty controller.
    pub fn effective_temp(&self) -> u8 {
        self.gpu_temp.map_or(self.cpu_temp, |gpu| gpu.max(self.cpu_temp))
    }
}

/// Apply the offset table through `fetch`.
///
/// Registers are fetched in a fixed order (CPU, GPU, duty, RPM high, RPM
/// low) so the handshake path is deterministic.
pub fn readings_from(mut fetch: impl FnMut(u8) -> u8, gpu_sensor: bool) -> ReadingSet {
    let cpu_temp = fetch(REG_CPU_TEMP);
    let gpu_temp = gpu_sensor.then(|| fetch(REG_GPU_TEMP));
    let duty = fetch(REG_FAN_DUTY);
    let hi = fetch(REG_FAN_RPM_HI);
    let lo = fetch(REG_FAN_RPM_LO);
    ReadingSet {
        cpu_temp,
        gpu_temp,
        fan_duty_percent: duty_percent(duty),
        fan_rpm: rpm(rpm_count(hi, lo)),
    }
}

/// The full EC register file, as returned by the bulk side channel.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterBlock([u8; REGISTER_FILE_LEN]);

impl RegisterBlock {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BulkReadError> {
        let block: [u8; REGISTER_FILE_LEN] = bytes
            .try_into()
            .map_err(|_| BulkReadError::Malformed { len: bytes.len() })?;
        Ok(Self(block))
    }

    pub fn get(&self, offset: u8) -> u8 {
        self.0[offset as usize]
    }

    pub fn readings(&self, gpu_sensor: bool) -> ReadingSet {
        readings_from(|offset| self.get(offset), gpu_sensor)
    }
}

impl core::fmt::Debug for RegisterBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterBlock")
            .field("cpu", &self.get(REG_CPU_TEMP))
            .field("gpu", &self.get(REG_GPU_TEMP))
            .field("duty", &self.get(REG_FAN_DUTY))
            .finish_non_exhaustive()
    }
}
