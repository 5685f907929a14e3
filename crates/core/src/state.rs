use serde::Serialize;

/// Throughput derived from the rate window, in bytes/second.
///
/// Every field is `>= 0.0`, and exactly `0.0` only when the underlying
/// counter did not move across the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RateSnapshot {
    pub disk_read: f64,
    pub disk_write: f64,
    pub net_in: f64,
    pub net_out: f64,
}

/// A point-in-time snapshot of host resource usage.
///
/// Byte-denominated figures are whole MiB; `*_rate` fields are raw
/// bytes/second.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeMetrics {
    /// RAM used in MiB.
    pub memory_used: u64,
    /// Total RAM in MiB.
    pub memory_total: u64,
    pub swap_used: u64,
    pub swap_total: u64,

    /// Filesystem holding the configured disk path: used MiB.
    pub disk_used: u64,
    /// Filesystem holding the configured disk path: total MiB.
    pub disk_total: u64,
    /// Cumulative MiB read, summed over all devices.
    pub disk_read: u64,
    /// Cumulative MiB written, summed over all devices.
    pub disk_write: u64,
    pub disk_read_rate: f64,
    pub disk_write_rate: f64,

    /// Cumulative MiB received, summed over all interfaces.
    pub net_in: u64,
    /// Cumulative MiB sent, summed over all interfaces.
    pub net_out: u64,
    pub net_in_rate: f64,
    pub net_out_rate: f64,

    /// Global CPU usage (0.0 – 100.0).
    pub cpu_used: f64,
    /// Logical CPU count.
    pub cpu_threads: usize,
    pub cpu_model: String,
}

impl NodeMetrics {
    /// RAM usage as a percentage in `[0, 100]`.
    #[must_use]
    pub fn memory_percent(&self) -> f64 {
        percent(self.memory_used, self.memory_total)
    }

    #[must_use]
    pub fn swap_percent(&self) -> f64 {
        percent(self.swap_used, self.swap_total)
    }

    #[must_use]
    pub fn disk_percent(&self) -> f64 {
        percent(self.disk_used, self.disk_total)
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}
