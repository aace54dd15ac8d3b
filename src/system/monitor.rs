use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::error::MonitorError;
use super::init::initialize;
use super::provider::StatsProvider;
use super::sampler::{DEFAULT_CPU_WINDOW, Samplers};
use super::scheduler::{Intervals, Scheduler};
use super::snapshot::SharedSnapshot;
use crate::format::UnitScale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    pub intervals: Intervals,
    pub cpu_window: Duration,
    pub unit_scale: UnitScale,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            intervals: Intervals::default(),
            cpu_window: DEFAULT_CPU_WINDOW,
            unit_scale: UnitScale::default(),
        }
    }
}

/// Owns the provider and the process-wide snapshot.
pub struct Monitor {
    provider: Arc<dyn StatsProvider>,
    snapshot: SharedSnapshot,
    options: MonitorOptions,
}

impl Monitor {
    pub fn new(provider: Arc<dyn StatsProvider>, options: MonitorOptions) -> Self {
        Self {
            provider,
            snapshot: SharedSnapshot::new(),
            options,
        }
    }

    /// Reader handle for consumers of the snapshot.
    pub fn snapshot(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    pub fn samplers(&self, cancel: &CancellationToken) -> Samplers {
        Samplers::new(
            Arc::clone(&self.provider),
            self.snapshot.clone(),
            cancel.clone(),
        )
        .with_cpu_window(self.options.cpu_window)
        .with_unit_scale(self.options.unit_scale)
    }

    pub async fn initialize(&self, cancel: &CancellationToken) -> Result<(), MonitorError> {
        initialize(Arc::clone(&self.provider), &self.snapshot, cancel).await
    }

    /// Collects the static facts, then starts periodic sampling in the
    /// background. An initialization error is returned and nothing is
    /// scheduled.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<JoinHandle<()>, MonitorError> {
        self.initialize(cancel).await?;
        let scheduler = Scheduler::new(self.samplers(cancel), self.options.intervals);
        Ok(tokio::spawn(scheduler.run(cancel.clone())))
    }
}
