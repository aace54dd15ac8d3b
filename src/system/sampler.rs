use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio_util::sync::CancellationToken;

use super::error::MonitorError;
use super::provider::{StatsProvider, cancellable};
use super::snapshot::{CpuLoad, SharedSnapshot, SnapshotUpdate, SystemMemory};
use super::uptime::compute_uptime;
use crate::format::{UnitScale, scale_bytes};

pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(1);

/// The dynamic metric samplers.
///
/// Each sampler finishes its provider calls and transformation before it
/// touches the snapshot, then publishes its sub-record in one write. On
/// error nothing is published and the previous values stay in place.
#[derive(Clone)]
pub struct Samplers {
    provider: Arc<dyn StatsProvider>,
    snapshot: SharedSnapshot,
    cancel: CancellationToken,
    cpu_window: Duration,
    unit_scale: UnitScale,
}

impl Samplers {
    pub fn new(
        provider: Arc<dyn StatsProvider>,
        snapshot: SharedSnapshot,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            provider,
            snapshot,
            cancel,
            cpu_window: DEFAULT_CPU_WINDOW,
            unit_scale: UnitScale::default(),
        }
    }

    pub fn with_cpu_window(mut self, window: Duration) -> Self {
        self.cpu_window = window;
        self
    }

    pub fn with_unit_scale(mut self, scale: UnitScale) -> Self {
        self.unit_scale = scale;
        self
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    pub async fn sample_cpu_load(&self) -> Result<(), MonitorError> {
        let provider = self.provider.as_ref();
        let cancel = &self.cancel;
        let (total, per_core) = tokio::try_join!(
            cancellable(cancel, provider.cpu_percent(cancel, self.cpu_window, false)),
            cancellable(cancel, provider.cpu_percent(cancel, self.cpu_window, true)),
        )?;
        let total = total
            .first()
            .copied()
            .ok_or(MonitorError::EmptyReading("cpu_percent"))?;

        let load = CpuLoad::from_readings(total, &per_core);
        self.snapshot.publish(SnapshotUpdate::CpuLoad(load)).await;
        Ok(())
    }

    pub async fn sample_memory(&self) -> Result<(), MonitorError> {
        let mem = cancellable(&self.cancel, self.provider.virtual_memory(&self.cancel)).await?;

        // One divisor for both figures, picked from the total.
        let (divisor, unit) = self.unit_scale.select(mem.total);
        let memory = SystemMemory {
            unit,
            total: scale_bytes(mem.total, divisor),
            available: scale_bytes(mem.available, divisor),
            used: mem.used_percent,
        };
        self.snapshot.publish(SnapshotUpdate::Memory(memory)).await;
        Ok(())
    }

    pub async fn sample_uptime(&self) -> Result<(), MonitorError> {
        self.sample_uptime_at(&Local::now()).await
    }

    pub async fn sample_uptime_at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<(), MonitorError> {
        let boot_seconds =
            cancellable(&self.cancel, self.provider.uptime_seconds(&self.cancel)).await?;
        let uptime = compute_uptime(boot_seconds, now)?;
        self.snapshot.publish(SnapshotUpdate::Uptime(uptime)).await;
        Ok(())
    }
}
