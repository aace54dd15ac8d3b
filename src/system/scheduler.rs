use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::MonitorError;
use super::sampler::Samplers;

const ERROR_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CpuLoad,
    Memory,
    Uptime,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::CpuLoad => "cpu_load",
            Metric::Memory => "memory",
            Metric::Uptime => "uptime",
        };
        f.write_str(name)
    }
}

/// A failed periodic sample, as seen by the monitoring loop.
#[derive(Debug)]
pub struct SampleFailure {
    pub metric: Metric,
    pub error: MonitorError,
}

/// Sampling period per metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub cpu_load: Duration,
    pub memory: Duration,
    pub uptime: Duration,
}

impl Intervals {
    /// Replaces zero periods, which `tokio::time::interval` rejects, with
    /// the defaults.
    pub fn or_default_when_zero(self) -> Self {
        let defaults = Intervals::default();
        let pick = |metric: Metric, value: Duration, fallback: Duration| {
            if value.is_zero() {
                warn!(
                    %metric,
                    fallback_ms = fallback.as_millis() as u64,
                    "zero sampling interval, using default"
                );
                fallback
            } else {
                value
            }
        };
        Intervals {
            cpu_load: pick(Metric::CpuLoad, self.cpu_load, defaults.cpu_load),
            memory: pick(Metric::Memory, self.memory, defaults.memory),
            uptime: pick(Metric::Uptime, self.uptime, defaults.uptime),
        }
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Intervals {
            cpu_load: Duration::from_secs(3),
            memory: Duration::from_secs(5),
            uptime: Duration::from_secs(1),
        }
    }
}

pub struct Scheduler {
    samplers: Samplers,
    intervals: Intervals,
    failures: Option<mpsc::Sender<SampleFailure>>,
}

impl Scheduler {
    pub fn new(samplers: Samplers, intervals: Intervals) -> Self {
        Self {
            samplers,
            intervals: intervals.or_default_when_zero(),
            failures: None,
        }
    }

    /// Forwards every sampling failure to `tx` instead of the built-in
    /// logging loop. Failures that do not fit into the channel are logged
    /// and dropped.
    pub fn with_failure_sink(mut self, tx: mpsc::Sender<SampleFailure>) -> Self {
        self.failures = Some(tx);
        self
    }

    /// Samples every metric on its own timer until `cancel` fires.
    ///
    /// Samplers run inline on the dispatch loop. Failures go to the
    /// monitoring loop and never stop the schedule.
    pub async fn run(self, cancel: CancellationToken) {
        let (failures, monitor) = match self.failures {
            Some(tx) => (tx, None),
            None => {
                let (tx, rx) = mpsc::channel(ERROR_CHANNEL_CAPACITY);
                (tx, Some(spawn_failure_monitor(rx)))
            }
        };

        let mut cpu_tick = interval(self.intervals.cpu_load);
        let mut memory_tick = interval(self.intervals.memory);
        let mut uptime_tick = interval(self.intervals.uptime);
        for tick in [&mut cpu_tick, &mut memory_tick, &mut uptime_tick] {
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }

        info!(
            cpu_ms = self.intervals.cpu_load.as_millis() as u64,
            memory_ms = self.intervals.memory.as_millis() as u64,
            uptime_ms = self.intervals.uptime.as_millis() as u64,
            "sampling scheduler started"
        );

        loop {
            let (metric, result) = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = uptime_tick.tick() => (Metric::Uptime, self.samplers.sample_uptime().await),
                _ = cpu_tick.tick() => (Metric::CpuLoad, self.samplers.sample_cpu_load().await),
                _ = memory_tick.tick() => (Metric::Memory, self.samplers.sample_memory().await),
            };

            match result {
                Ok(()) => debug!(%metric, "sample published"),
                Err(error) => match failures.try_send(SampleFailure { metric, error }) {
                    Ok(()) => {}
                    Err(TrySendError::Full(failure)) => {
                        warn!(
                            %metric,
                            error = %failure.error,
                            "failure channel full, dropping sampling error"
                        );
                    }
                    Err(TrySendError::Closed(failure)) => {
                        warn!(
                            %metric,
                            error = %failure.error,
                            "failure monitor is gone, dropping sampling error"
                        );
                    }
                },
            }
        }

        drop(failures);
        if let Some(monitor) = monitor {
            join_failure_monitor(monitor).await;
        }
        info!("sampling scheduler stopped");
    }
}

fn spawn_failure_monitor(mut rx: mpsc::Receiver<SampleFailure>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = rx.recv().await {
            warn!(metric = %failure.metric, error = %failure.error, "sampling failed");
        }
    })
}

/// Waits for the monitoring task to drain. Returns false if it panicked or
/// was aborted.
async fn join_failure_monitor(monitor: JoinHandle<()>) -> bool {
    match monitor.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failure monitor task ended abnormally");
            false
        }
    }
}
