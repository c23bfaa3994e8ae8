use serde::{Deserialize, Serialize};

/// Environment variable overriding the probed core count.
pub const CORES_ENV: &str = "DOTMOSAIC_DEVICE_CORES";
/// Environment variable overriding the probed memory size, in GB.
pub const MEMORY_ENV: &str = "DOTMOSAIC_DEVICE_MEMORY_GB";

const DEFAULT_CORES: u32 = 4;
const DEFAULT_MEMORY_GB: f64 = 4.0;

/// Quality profile trading dot count for throughput.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Pick a profile from device capabilities.
    #[default]
    Auto,
    /// Requested grid size, unmodified.
    High,
    /// Mild reduction.
    Balanced,
    /// Strong reduction; the canvas driver also draws every other frame.
    Low,
}

/// What the host reports about the device. Missing values count as 4 cores / 4 GB.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceCapabilities {
    /// Logical CPU cores.
    pub cores: Option<u32>,
    /// Device memory in GB.
    pub memory_gb: Option<f64>,
}

/// Source of [`DeviceCapabilities`].
pub trait CapabilityProvider {
    /// Current device capabilities.
    fn capabilities(&self) -> DeviceCapabilities;
}

impl CapabilityProvider for DeviceCapabilities {
    fn capabilities(&self) -> DeviceCapabilities {
        *self
    }
}

/// Probes the running machine.
///
/// Cores come from [`std::thread::available_parallelism`], memory from `/proc/meminfo` where
/// available. [`CORES_ENV`] and [`MEMORY_ENV`] take precedence over both probes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCapabilities;

impl CapabilityProvider for SystemCapabilities {
    fn capabilities(&self) -> DeviceCapabilities {
        let cores = env_number::<u32>(CORES_ENV).or_else(|| {
            std::thread::available_parallelism()
                .ok()
                .and_then(|n| u32::try_from(n.get()).ok())
        });
        let memory_gb = env_number::<f64>(MEMORY_ENV)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .or_else(probe_memory_gb);
        DeviceCapabilities { cores, memory_gb }
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparsable capability override");
            None
        }
    }
}

fn probe_memory_gb() -> Option<f64> {
    let text = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo_total_gb(&text)
}

/// `MemTotal` from a `/proc/meminfo` dump, in GB.
pub(crate) fn parse_meminfo_total_gb(text: &str) -> Option<f64> {
    let line = text.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / (1024.0 * 1024.0))
}

fn scaled(grid: u32, factor: f64, min: u32) -> u32 {
    ((f64::from(grid) * factor).floor() as u32).max(min)
}

/// Grid size actually sampled for `base` under `quality`.
///
/// `base` is treated as at least 1. Reduced profiles never go below their floor, even when that
/// exceeds `base`.
pub fn effective_grid_size(base: u32, quality: Quality, caps: &DeviceCapabilities) -> u32 {
    let grid = base.max(1);
    match quality {
        Quality::High => grid,
        Quality::Low => scaled(grid, 0.68, 6),
        Quality::Balanced => scaled(grid, 0.86, 8),
        Quality::Auto => {
            let cores = caps.cores.unwrap_or(DEFAULT_CORES);
            let memory = caps.memory_gb.unwrap_or(DEFAULT_MEMORY_GB);
            if cores <= 2 || memory <= 2.0 {
                scaled(grid, 0.64, 6)
            } else if cores <= 4 || memory <= 4.0 {
                scaled(grid, 0.82, 8)
            } else {
                grid
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/quality.rs"]
mod tests;
