use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tokio_util::sync::CancellationToken;

use super::error::MonitorError;
use super::platform;
use super::provider::{StatsProvider, VirtualMemory};
use super::snapshot::{CpuIdentity, Platform};

/// [`StatsProvider`] backed by `sysinfo`.
///
/// Every call builds its own `System`, so concurrent calls never contend on
/// shared refresh state. The OS queries run on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Collector;

impl Collector {
    pub fn new() -> Self {
        Collector
    }
}

async fn blocking<T, F>(f: F) -> Result<T, MonitorError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MonitorError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

fn cpu_system(kind: CpuRefreshKind) -> System {
    System::new_with_specifics(RefreshKind::nothing().with_cpu(kind))
}

#[async_trait]
impl StatsProvider for Collector {
    async fn host_info(&self, _cancel: &CancellationToken) -> Result<Platform, MonitorError> {
        blocking(|| {
            let kernel = System::kernel_version()
                .ok_or_else(|| MonitorError::provider("host_info", "kernel version unavailable"))?;
            Ok(Platform {
                arch: System::cpu_arch(),
                os: System::os_version().unwrap_or_default(),
                platform: System::distribution_id(),
                family: platform::platform_family().unwrap_or_default(),
                kernel,
            })
        })
        .await
    }

    async fn physical_core_count(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<usize, MonitorError> {
        blocking(|| {
            System::physical_core_count()
                .filter(|&n| n > 0)
                .ok_or(MonitorError::EmptyReading("physical_core_count"))
        })
        .await
    }

    async fn logical_thread_count(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<usize, MonitorError> {
        blocking(|| {
            let sys = cpu_system(CpuRefreshKind::nothing());
            match sys.cpus().len() {
                0 => Err(MonitorError::EmptyReading("logical_thread_count")),
                n => Ok(n),
            }
        })
        .await
    }

    async fn cpu_identity(&self, _cancel: &CancellationToken) -> Result<CpuIdentity, MonitorError> {
        blocking(|| {
            let sys = cpu_system(CpuRefreshKind::everything());
            let cpu = sys
                .cpus()
                .first()
                .ok_or(MonitorError::EmptyReading("cpu_identity"))?;
            Ok(CpuIdentity {
                vendor_id: cpu.vendor_id().to_string(),
                mhz: cpu.frequency() as f64,
                cache_size: platform::cpu_cache_size_kb().unwrap_or(0),
            })
        })
        .await
    }

    async fn cpu_percent(
        &self,
        cancel: &CancellationToken,
        window: Duration,
        per_core: bool,
    ) -> Result<Vec<f64>, MonitorError> {
        let mut sys = blocking(|| {
            let mut sys = cpu_system(CpuRefreshKind::nothing());
            sys.refresh_cpu_usage();
            Ok(sys)
        })
        .await?;

        // Usage is the delta between two refreshes, so the window is the
        // observation period.
        let window = window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        tokio::select! {
            _ = cancel.cancelled() => return Err(MonitorError::Cancelled),
            _ = tokio::time::sleep(window) => {}
        }

        blocking(move || {
            sys.refresh_cpu_usage();
            let readings: Vec<f64> = if per_core {
                sys.cpus().iter().map(|cpu| cpu.cpu_usage() as f64).collect()
            } else {
                vec![sys.global_cpu_usage() as f64]
            };
            if readings.is_empty() {
                return Err(MonitorError::EmptyReading("cpu_percent"));
            }
            Ok(readings)
        })
        .await
    }

    async fn virtual_memory(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<VirtualMemory, MonitorError> {
        blocking(|| {
            let sys = System::new_with_specifics(
                RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
            );
            let total = sys.total_memory();
            if total == 0 {
                return Err(MonitorError::EmptyReading("virtual_memory"));
            }
            Ok(VirtualMemory {
                total,
                available: sys.available_memory(),
                used_percent: sys.used_memory() as f64 / total as f64 * 100.0,
            })
        })
        .await
    }

    async fn uptime_seconds(&self, _cancel: &CancellationToken) -> Result<u64, MonitorError> {
        blocking(|| Ok(System::uptime())).await
    }
}
