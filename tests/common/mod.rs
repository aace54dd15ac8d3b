#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use resourcer::system::snapshot::{CpuIdentity, Platform};
use resourcer::system::{MonitorError, StatsProvider, VirtualMemory};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    HostInfo,
    PhysicalCores,
    LogicalThreads,
    CpuIdentity,
    CpuTotal,
    CpuPerCore,
    VirtualMemory,
    Uptime,
}

impl Call {
    fn name(self) -> &'static str {
        match self {
            Call::HostInfo => "host_info",
            Call::PhysicalCores => "physical_core_count",
            Call::LogicalThreads => "logical_thread_count",
            Call::CpuIdentity => "cpu_identity",
            Call::CpuTotal => "cpu_percent_total",
            Call::CpuPerCore => "cpu_percent_per_core",
            Call::VirtualMemory => "virtual_memory",
            Call::Uptime => "uptime",
        }
    }
}

/// Scriptable provider: fixed readings, per-call failure switches and call
/// counters.
pub struct FakeProvider {
    failing: Mutex<HashSet<Call>>,
    counts: Mutex<HashMap<Call, usize>>,
    pub total: Mutex<f64>,
    pub per_core: Mutex<Vec<f64>>,
    pub memory: Mutex<VirtualMemory>,
    pub uptime: Mutex<u64>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        FakeProvider {
            failing: Mutex::new(HashSet::new()),
            counts: Mutex::new(HashMap::new()),
            total: Mutex::new(42.0),
            per_core: Mutex::new(vec![0.1, 0.5, 0.9]),
            memory: Mutex::new(VirtualMemory {
                total: 8_000_000_000,
                available: 2_000_000_000,
                used_percent: 75.0,
            }),
            uptime: Mutex::new(5_400),
        }
    }

    pub fn fail(&self, call: Call) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn recover(&self, call: Call) {
        self.failing.lock().unwrap().remove(&call);
    }

    pub fn calls(&self, call: Call) -> usize {
        self.counts.lock().unwrap().get(&call).copied().unwrap_or(0)
    }

    pub fn set_cpu(&self, total: f64, per_core: Vec<f64>) {
        *self.total.lock().unwrap() = total;
        *self.per_core.lock().unwrap() = per_core;
    }

    fn enter(&self, call: Call) -> Result<(), MonitorError> {
        *self.counts.lock().unwrap().entry(call).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(&call) {
            return Err(MonitorError::provider(call.name(), "injected failure"));
        }
        Ok(())
    }
}

pub fn sample_platform() -> Platform {
    Platform {
        arch: "x86_64".to_string(),
        os: "22.04".to_string(),
        platform: "ubuntu".to_string(),
        family: "debian".to_string(),
        kernel: "6.8.0-45-generic".to_string(),
    }
}

#[async_trait]
impl StatsProvider for FakeProvider {
    async fn host_info(&self, _cancel: &CancellationToken) -> Result<Platform, MonitorError> {
        self.enter(Call::HostInfo)?;
        Ok(sample_platform())
    }

    async fn physical_core_count(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<usize, MonitorError> {
        self.enter(Call::PhysicalCores)?;
        Ok(4)
    }

    async fn logical_thread_count(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<usize, MonitorError> {
        self.enter(Call::LogicalThreads)?;
        Ok(8)
    }

    async fn cpu_identity(&self, _cancel: &CancellationToken) -> Result<CpuIdentity, MonitorError> {
        self.enter(Call::CpuIdentity)?;
        Ok(CpuIdentity {
            vendor_id: "GenuineIntel".to_string(),
            mhz: 2400.0,
            cache_size: 8192,
        })
    }

    async fn cpu_percent(
        &self,
        _cancel: &CancellationToken,
        window: Duration,
        per_core: bool,
    ) -> Result<Vec<f64>, MonitorError> {
        let call = if per_core { Call::CpuPerCore } else { Call::CpuTotal };
        self.enter(call)?;
        if !window.is_zero() {
            tokio::time::sleep(window).await;
        }
        if per_core {
            Ok(self.per_core.lock().unwrap().clone())
        } else {
            Ok(vec![*self.total.lock().unwrap()])
        }
    }

    async fn virtual_memory(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<VirtualMemory, MonitorError> {
        self.enter(Call::VirtualMemory)?;
        Ok(*self.memory.lock().unwrap())
    }

    async fn uptime_seconds(&self, _cancel: &CancellationToken) -> Result<u64, MonitorError> {
        self.enter(Call::Uptime)?;
        Ok(*self.uptime.lock().unwrap())
    }
}
