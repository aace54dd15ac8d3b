//! Host telemetry collector.
//!
//! Static host facts are read once at startup; CPU load, memory and uptime
//! are re-sampled on independent timers and published into one
//! [`SharedSnapshot`](system::SharedSnapshot) that any number of readers can
//! poll.

pub mod config;
pub mod format;
pub mod logging;
pub mod system;
