//! Inbound commands from the presentation layer.
//!
//! Commands are validated here, synchronously, before they ever reach the
//! shared block: an out-of-range duty is rejected to the caller and the
//! worker never sees it.

use crate::error::{Error, Result};

/// Lowest duty the EC accepts for a direct write.
pub const MANUAL_DUTY_MIN: u8 = 60;
pub const MANUAL_DUTY_MAX: u8 = 100;

/// A manual duty request known to be within 60–100 %.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualDuty(u8);

impl ManualDuty {
    pub fn new(percent: u8) -> Result<Self> {
        if (MANUAL_DUTY_MIN..=MANUAL_DUTY_MAX).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(Error::InvalidCommand(percent))
        }
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ManualDuty {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        let percent = u8::try_from(value).map_err(|_| Error::InvalidCommand(u8::MAX))?;
        Self::new(percent)
    }
}

/// Commands the presentation layer can submit into the shared block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCommand {
    /// Hand control back to the auto-duty policy.
    Auto,
    /// Hold the fan at a fixed duty.
    Manual(ManualDuty),
    /// Stop the worker at the top of its next cycle.
    Exit,
}

impl FanCommand {
    /// Build a manual command, rejecting out-of-range duties.
    pub fn manual(percent: u8) -> Result<Self> {
        ManualDuty::new(percent).map(Self::Manual)
    }
}
