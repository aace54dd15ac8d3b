use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::format::MemoryUnit;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Platform {
    pub arch: String,
    pub os: String,
    pub platform: String,
    pub family: String,
    pub kernel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub vendor_id: String,
    pub mhz: f64,
    /// Cache size in KB, as reported by the platform.
    pub cache_size: i64,
    pub cores: usize,
    pub threads: usize,
}

/// CPU identity block as read at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuIdentity {
    pub vendor_id: String,
    pub mhz: f64,
    pub cache_size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemLoad {
    pub cpu: CpuLoad,
    pub memory: SystemMemory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuLoad {
    pub total: f64,
    pub per_core: Vec<CoreLoad>,
}

impl CpuLoad {
    /// Builds the load record, numbering cores by their position.
    pub fn from_readings(total: f64, per_core: &[f64]) -> Self {
        CpuLoad {
            total,
            per_core: per_core
                .iter()
                .enumerate()
                .map(|(core_number, &load)| CoreLoad {
                    core_number,
                    load: load as f32,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreLoad {
    pub core_number: usize,
    pub load: f32,
}

/// Memory figures scaled by `unit`; `used` is an unscaled percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SystemMemory {
    pub unit: MemoryUnit,
    pub total: f64,
    pub available: f64,
    pub used: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemUptime {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub platform: Platform,
    pub cpu: CpuInfo,
    pub system_load: SystemLoad,
    pub uptime: SystemUptime,
}

impl SystemSnapshot {
    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} {} ({}), CPU {:.1}% on {}c/{}t, Mem {:.2}/{:.2} {} avail ({:.1}% used), up {}y {}mo {}d {}h {}m",
            self.platform.platform,
            self.platform.os,
            self.platform.arch,
            self.system_load.cpu.total,
            self.cpu.cores,
            self.cpu.threads,
            self.system_load.memory.available,
            self.system_load.memory.total,
            self.system_load.memory.unit,
            self.system_load.memory.used,
            self.uptime.years,
            self.uptime.months,
            self.uptime.days,
            self.uptime.hours,
            self.uptime.minutes,
        )
    }
}

/// A write into the snapshot. Each variant touches only the fields its
/// producer owns and is applied under one exclusive lock.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotUpdate {
    Platform(Platform),
    CpuIdentity(CpuIdentity),
    PhysicalCores(usize),
    LogicalThreads(usize),
    CpuLoad(CpuLoad),
    Memory(SystemMemory),
    Uptime(SystemUptime),
}

impl SnapshotUpdate {
    fn apply(self, snapshot: &mut SystemSnapshot) {
        match self {
            SnapshotUpdate::Platform(platform) => snapshot.platform = platform,
            SnapshotUpdate::CpuIdentity(identity) => {
                snapshot.cpu.vendor_id = identity.vendor_id;
                snapshot.cpu.mhz = identity.mhz;
                snapshot.cpu.cache_size = identity.cache_size;
            }
            SnapshotUpdate::PhysicalCores(cores) => snapshot.cpu.cores = cores,
            SnapshotUpdate::LogicalThreads(threads) => snapshot.cpu.threads = threads,
            SnapshotUpdate::CpuLoad(load) => snapshot.system_load.cpu = load,
            SnapshotUpdate::Memory(memory) => snapshot.system_load.memory = memory,
            SnapshotUpdate::Uptime(uptime) => snapshot.uptime = uptime,
        }
    }
}

/// Shared handle to the process-wide snapshot.
///
/// Cloning the handle shares the same state. Readers get a copy taken under
/// the shared lock, so they never see half of an update.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<SystemSnapshot>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> SystemSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn publish(&self, update: SnapshotUpdate) {
        tracing::trace!(?update, "publishing snapshot update");

        let mut guard = self.inner.write().await;
        update.apply(&mut guard);
    }
}
