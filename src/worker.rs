//! Privileged worker loop.
//!
//! Repeats [`FanService::tick`] on a fixed interval until the exit flag in
//! the shared block is observed at the top of an iteration. Cancellation is
//! cooperative: worst-case shutdown latency is one sampling interval plus
//! one cycle's handshake timeouts.
//!
//! On exit the worker writes nothing to the EC; the fan keeps its last duty.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

use crate::app::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use crate::app::service::FanService;
use crate::config::Config;
use crate::error::Result;
use crate::shared::SharedState;

pub struct Worker<H, K, C> {
    service: FanService<C>,
    hw: H,
    sink: K,
    shared: Arc<SharedState>,
    interval: Duration,
}

impl<H, K, C> Worker<H, K, C>
where
    H: SensorPort + ActuatorPort,
    K: EventSink,
    C: ClockPort,
{
    pub fn new(hw: H, sink: K, clock: C, shared: Arc<SharedState>, interval: Duration) -> Self {
        Self {
            service: FanService::new(clock),
            hw,
            sink,
            shared,
            interval,
        }
    }

    pub fn from_config(hw: H, sink: K, clock: C, shared: Arc<SharedState>, config: &Config) -> Self {
        let interval = Duration::from_millis(u64::from(config.sample_interval_ms));
        Self::new(hw, sink, clock, shared, interval)
    }

    /// Run until the exit flag is set. Returns the number of cycles run.
    ///
    /// A fatal error raises the exit flag before returning so the
    /// presentation layer stops trusting the block.
    pub fn run(mut self) -> Result<u64> {
        self.service.start(&self.hw, &mut self.sink);
        while !self.shared.exit_requested() {
            if let Err(e) = self.service.tick(&mut self.hw, &self.shared, &mut self.sink) {
                error!("Worker stopping: {}", e);
                self.shared.request_exit();
                return Err(e);
            }
            thread::sleep(self.interval);
        }
        info!("Exit flag observed");
        self.service.stop(&mut self.sink);
        Ok(self.service.cycles())
    }
}

impl<H, K, C> Worker<H, K, C>
where
    H: SensorPort + ActuatorPort + Send + 'static,
    K: EventSink + Send + 'static,
    C: ClockPort + Send + 'static,
{
    /// Run the loop on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<Result<u64>>> {
        thread::Builder::new()
            .name("ecfan-worker".into())
            .spawn(move || self.run())
    }
}
