use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `nodestat.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub system: SystemConfig,
    pub rates: RatesConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `"0.0.0.0:8080"`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// What to sample on the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Path whose filesystem is reported as `disk_used` / `disk_total`.
    pub disk_path: PathBuf,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            disk_path: PathBuf::from("/"),
        }
    }
}

/// Tuning for the I/O rate window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Number of samples kept in the window.
    pub history_capacity: usize,
    /// Smallest divisor used when samples arrive close together.
    pub min_elapsed_secs: f64,
    /// Lowest non-zero rate ever reported (bytes/second).
    pub min_rate: f64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            history_capacity: 5,
            min_elapsed_secs: 0.1,
            min_rate: 0.01,
        }
    }
}
