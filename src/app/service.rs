//! Application service — one worker cycle.
//!
//! [`FanService`] implements the per-cycle rules: manual override first,
//! then sample and publish, then the auto-duty policy. All I/O flows through
//! port traits injected at call sites.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       FanService        │
//! ActuatorPort ◀──│ override · auto-duty    │ ◀─▶ SharedStateBlock
//!                 └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::control::next_duty;
use crate::ec::ReadingSet;
use crate::error::Result;
use crate::shared::{ControlMode, SharedStateBlock};

use super::commands::ManualDuty;
use super::events::{AppEvent, DutySource};
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};

/// Outcome of a single [`FanService::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub readings: ReadingSet,
    /// Duty written this cycle, if any.
    pub applied: Option<(u8, DutySource)>,
}

pub struct FanService<C> {
    clock: C,
    cycles: u64,
    bulk_active: bool,
    /// Last out-of-range manual target seen, so it is logged once.
    rejected_target: u8,
}

impl<C: ClockPort> FanService<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            cycles: 0,
            bulk_active: false,
            rejected_target: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, hw: &impl SensorPort, sink: &mut impl EventSink) {
        self.bulk_active = hw.bulk_active();
        sink.emit(&AppEvent::Started {
            bulk: self.bulk_active,
        });
        info!(
            "Fan service started ({} sampling)",
            if self.bulk_active { "bulk" } else { "handshake" }
        );
    }

    pub fn stop(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Stopped {
            cycles: self.cycles,
        });
        info!("Fan service stopped after {} cycles", self.cycles);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one cycle: manual override → sample → publish → auto-duty.
    ///
    /// Only fatal errors are returned; handshake timeouts are logged and
    /// the cycle carries on.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        shared: &SharedStateBlock,
        sink: &mut impl EventSink,
    ) -> Result<CycleReport> {
        self.cycles += 1;

        // 1. Manual override takes the cycle if one is pending.
        let manual = self.apply_manual(hw, shared, sink)?;

        // 2. Sample and publish.
        let readings = hw.sample()?;
        shared.publish(&readings);
        self.note_bulk_state(hw, sink);
        debug!(
            "cpu={}C gpu={:?}C duty={}% rpm={}",
            readings.cpu_temp, readings.gpu_temp, readings.fan_duty_percent, readings.fan_rpm
        );

        let mut applied = manual.map(|duty| (duty, DutySource::Manual));

        // 3. Automatic control, unless a manual write already happened.
        match shared.mode() {
            ControlMode::Auto if applied.is_none() => {
                let next = next_duty(readings.effective_temp(), readings.fan_duty_percent);
                if let Some(duty) = next.filter(|&d| d != shared.auto_duty()) {
                    self.write_duty(hw, duty, sink)?;
                    shared.set_auto_duty(duty);
                    applied = Some((duty, DutySource::Auto));
                }
            }
            ControlMode::Auto => {}
            ControlMode::Manual => {
                // Forget the last auto decision so re-entering Auto always
                // re-asserts the policy.
                if shared.auto_duty() != 0 {
                    shared.set_auto_duty(0);
                }
            }
        }

        if let Some((duty, source)) = applied {
            sink.emit(&AppEvent::duty_applied(
                self.clock.unix_time(),
                &readings,
                duty,
                source,
            ));
        }

        Ok(CycleReport { readings, applied })
    }

    // ── Queries ───────────────────────────────────────────────

    /// Cycles executed since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    // ── Internal ──────────────────────────────────────────────

    /// Write a pending manual duty. Returns the duty if one was written.
    fn apply_manual(
        &mut self,
        hw: &mut impl ActuatorPort,
        shared: &SharedStateBlock,
        sink: &mut impl EventSink,
    ) -> Result<Option<u8>> {
        let target = shared.manual_target();
        let previous = shared.manual_applied();
        if target == 0 {
            // Back in Auto: drop the bookkeeping so the same manual duty
            // chosen later is written again.
            if previous != 0 {
                shared.set_manual_applied(0);
            }
            return Ok(None);
        }
        if target == previous {
            return Ok(None);
        }
        // The block is writable by unprivileged peers; re-check the range
        // before anything reaches the EC.
        let Ok(duty) = ManualDuty::new(target) else {
            if self.rejected_target != target {
                warn!("Ignoring out-of-range manual duty {}%", target);
                self.rejected_target = target;
            }
            return Ok(None);
        };
        self.rejected_target = 0;
        self.write_duty(hw, duty.percent(), sink)?;
        shared.set_manual_applied(duty.percent());
        Ok(Some(duty.percent()))
    }

    fn write_duty(
        &mut self,
        hw: &mut impl ActuatorPort,
        duty: u8,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match hw.write_duty(duty) {
            Ok(()) => Ok(()),
            Err(e) if !e.is_fatal() => {
                warn!("Fan duty {}% not confirmed: {}", duty, e);
                sink.emit(&AppEvent::WriteUnconfirmed { duty });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn note_bulk_state(&mut self, hw: &impl SensorPort, sink: &mut impl EventSink) {
        let active = hw.bulk_active();
        if self.bulk_active && !active {
            sink.emit(&AppEvent::BulkFallback);
        }
        self.bulk_active = active;
    }
}
