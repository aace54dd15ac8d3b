use serde::Serialize;

const KB: u64 = 1_000;
const MB: u64 = 1_000_000;
const GB: u64 = 1_000_000_000;

/// Display unit for the scaled memory figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryUnit {
    #[default]
    Kb,
    Mb,
    Gb,
}

impl MemoryUnit {
    pub fn label(self) -> &'static str {
        match self {
            MemoryUnit::Kb => "kb",
            MemoryUnit::Mb => "mb",
            MemoryUnit::Gb => "gb",
        }
    }
}

impl std::fmt::Display for MemoryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How a byte count is mapped onto a [`MemoryUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitScale {
    /// Exact magnitudes 6 and 9 only, kb for everything else.
    #[default]
    Legacy,
    /// kb below 10^6, mb up to 10^9, gb from there on.
    Monotonic,
}

impl UnitScale {
    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "monotonic" => UnitScale::Monotonic,
            _ => UnitScale::Legacy,
        }
    }

    pub fn select(self, total_bytes: u64) -> (u64, MemoryUnit) {
        match self {
            UnitScale::Legacy => select_unit(total_bytes),
            UnitScale::Monotonic => match magnitude(total_bytes) {
                0..=5 => (KB, MemoryUnit::Kb),
                6..=8 => (MB, MemoryUnit::Mb),
                _ => (GB, MemoryUnit::Gb),
            },
        }
    }
}

/// Number of decimal digits in `n`, minus one.
pub fn magnitude(n: u64) -> u32 {
    n.checked_ilog10().unwrap_or(0)
}

/// Picks the divisor and label for a memory total.
///
/// Only magnitudes 6 and 9 scale to mb and gb; magnitudes 7, 8 and 10+
/// stay in kb. Use [`UnitScale::Monotonic`] for a gap-free table.
pub fn select_unit(total_bytes: u64) -> (u64, MemoryUnit) {
    match magnitude(total_bytes) {
        6 => (MB, MemoryUnit::Mb),
        9 => (GB, MemoryUnit::Gb),
        _ => (KB, MemoryUnit::Kb),
    }
}

/// Divides `bytes` by `divisor` for display.
pub fn scale_bytes(bytes: u64, divisor: u64) -> f64 {
    bytes as f64 / divisor.max(1) as f64
}
