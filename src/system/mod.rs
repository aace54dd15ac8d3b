pub mod collector;
pub mod error;
pub mod init;
pub mod monitor;
pub(crate) mod platform;
pub mod provider;
pub mod sampler;
pub mod scheduler;
pub mod snapshot;
pub mod uptime;

pub use collector::Collector;
pub use error::MonitorError;
pub use monitor::{Monitor, MonitorOptions};
pub use provider::{StatsProvider, VirtualMemory};
pub use snapshot::{SharedSnapshot, SystemSnapshot};
