//! System clock adapter.
//!
//! Provides wall-clock timestamps for duty-change events.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    /// Seconds since the Unix epoch; 0 if the clock is set before 1970.
    fn unix_time(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}
