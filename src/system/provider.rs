use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::MonitorError;
use super::snapshot::{CpuIdentity, Platform};

/// Raw virtual memory figures in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualMemory {
    pub total: u64,
    pub available: u64,
    pub used_percent: f64,
}

/// Source of raw host statistics.
///
/// Every call receives the caller's cancellation token and may block for as
/// long as the underlying OS query takes. `cpu_percent` observes the CPU
/// for `window` before answering.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn host_info(&self, cancel: &CancellationToken) -> Result<Platform, MonitorError>;

    async fn physical_core_count(&self, cancel: &CancellationToken)
    -> Result<usize, MonitorError>;

    async fn logical_thread_count(
        &self,
        cancel: &CancellationToken,
    ) -> Result<usize, MonitorError>;

    async fn cpu_identity(&self, cancel: &CancellationToken) -> Result<CpuIdentity, MonitorError>;

    /// Usage percentages over `window`: one value when `per_core` is false,
    /// otherwise one per core in core order.
    async fn cpu_percent(
        &self,
        cancel: &CancellationToken,
        window: Duration,
        per_core: bool,
    ) -> Result<Vec<f64>, MonitorError>;

    async fn virtual_memory(&self, cancel: &CancellationToken)
    -> Result<VirtualMemory, MonitorError>;

    /// Seconds since boot.
    async fn uptime_seconds(&self, cancel: &CancellationToken) -> Result<u64, MonitorError>;
}

/// Runs `call` unless `cancel` fires first.
pub async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, MonitorError>
where
    F: Future<Output = Result<T, MonitorError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(MonitorError::Cancelled),
        result = call => result,
    }
}
