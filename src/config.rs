use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::format::UnitScale;
use crate::system::MonitorOptions;
use crate::system::scheduler::Intervals;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampling: SamplingConfig,
    pub memory: MemoryConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub cpu_interval_ms: u64,
    pub memory_interval_ms: u64,
    pub uptime_interval_ms: u64,
    pub cpu_window_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            cpu_interval_ms: 3000,
            memory_interval_ms: 5000,
            uptime_interval_ms: 1000,
            cpu_window_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub unit_scale: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            unit_scale: "legacy".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub interval_ms: u64,
    pub pretty: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            interval_ms: 5000,
            pretty: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// A problem found while loading the config that was recovered from.
///
/// Loading happens before the tracing subscriber exists, so warnings are
/// handed back to the caller to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    Unreadable { path: PathBuf, error: String },
    Invalid { path: PathBuf, error: String },
    ZeroInterval { setting: &'static str, fallback: u64 },
}

impl ConfigWarning {
    pub fn log(&self) {
        warn!("{self}");
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::Unreadable { path, error } => write!(
                f,
                "cannot read config file {}, using defaults: {error}",
                path.display()
            ),
            ConfigWarning::Invalid { path, error } => write!(
                f,
                "invalid config file {}, using defaults: {error}",
                path.display()
            ),
            ConfigWarning::ZeroInterval { setting, fallback } => write!(
                f,
                "zero interval is not allowed for {setting}, using default {fallback}"
            ),
        }
    }
}

impl Config {
    /// Replaces zero periods, which timers cannot run on, with defaults.
    pub fn sanitize(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let defaults = SamplingConfig::default();
        let sampling = &mut self.sampling;
        for (name, value, fallback) in [
            (
                "sampling.cpu_interval_ms",
                &mut sampling.cpu_interval_ms,
                defaults.cpu_interval_ms,
            ),
            (
                "sampling.memory_interval_ms",
                &mut sampling.memory_interval_ms,
                defaults.memory_interval_ms,
            ),
            (
                "sampling.uptime_interval_ms",
                &mut sampling.uptime_interval_ms,
                defaults.uptime_interval_ms,
            ),
            (
                "sampling.cpu_window_ms",
                &mut sampling.cpu_window_ms,
                defaults.cpu_window_ms,
            ),
        ] {
            if *value == 0 {
                warnings.push(ConfigWarning::ZeroInterval {
                    setting: name,
                    fallback,
                });
                *value = fallback;
            }
        }
        if self.report.interval_ms == 0 {
            let fallback = ReportConfig::default().interval_ms;
            warnings.push(ConfigWarning::ZeroInterval {
                setting: "report.interval_ms",
                fallback,
            });
            self.report.interval_ms = fallback;
        }
        warnings
    }

    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            intervals: Intervals {
                cpu_load: Duration::from_millis(self.sampling.cpu_interval_ms),
                memory: Duration::from_millis(self.sampling.memory_interval_ms),
                uptime: Duration::from_millis(self.sampling.uptime_interval_ms),
            },
            cpu_window: Duration::from_millis(self.sampling.cpu_window_ms),
            unit_scale: UnitScale::from_str_config(&self.memory.unit_scale),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("resourcer").join("config.toml"))
}

/// Loads the config from the default location, or defaults when absent.
pub fn load_config() -> (Config, Vec<ConfigWarning>) {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => (Config::default(), Vec::new()),
    }
}

/// Loads and sanitizes the config at `path`. Unreadable or invalid files
/// fall back to defaults; every fallback is reported as a warning.
pub fn load_config_from_path(path: &Path) -> (Config, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();
    let mut config = match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            warnings.push(ConfigWarning::Invalid {
                path: path.to_path_buf(),
                error: e.to_string(),
            });
            Config::default()
        }),
        Err(e) => {
            warnings.push(ConfigWarning::Unreadable {
                path: path.to_path_buf(),
                error: e.to_string(),
            });
            Config::default()
        }
    };
    warnings.extend(config.sanitize());
    (config, warnings)
}
