pub mod cpu;
pub mod history;
pub mod memory;
pub mod provider;

pub use history::{Counters, RateConfig, RateEstimator};
pub use provider::{MetricsProvider, SysinfoProvider};

use memory::to_mib;
use nodestat_core::{NodeMetrics, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Assembles [`NodeMetrics`] snapshots from a [`MetricsProvider`] and a
/// shared [`RateEstimator`].
///
/// Each call to [`snapshot`](Self::snapshot) is one sampling tick. There is no
/// background loop; ticks happen whenever a caller asks.
pub struct NodeMonitor {
    provider: Arc<dyn MetricsProvider>,
    estimator: Arc<RateEstimator>,
    disk_path: PathBuf,
}

impl NodeMonitor {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        estimator: Arc<RateEstimator>,
        disk_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            estimator,
            disk_path: disk_path.into(),
        }
    }

    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }

    pub fn estimator(&self) -> &RateEstimator {
        &self.estimator
    }

    /// Take one snapshot.
    ///
    /// All provider reads happen before the counters are recorded, so a
    /// failure leaves the rate window untouched and no partial snapshot is
    /// returned.
    pub fn snapshot(&self) -> Result<NodeMetrics> {
        let p = &self.provider;

        let memory = p.memory()?;
        let swap = p.swap()?;
        let disk = p.disk_usage(&self.disk_path)?;

        let (disk_read, disk_write) = p
            .disk_io_counters()?
            .iter()
            .fold((0u64, 0u64), |(r, w), io| {
                (r.saturating_add(io.read_bytes), w.saturating_add(io.write_bytes))
            });

        let cpu_model = cpu::first_model(&p.cpu_info()?)?;
        let cpu_used = cpu::sanitize_percent(p.cpu_percent()?);
        let cpu_threads = p.cpu_thread_count()?;

        let (net_in, net_out) = p
            .network_io_counters()?
            .iter()
            .fold((0u64, 0u64), |(i, o), io| {
                (i.saturating_add(io.bytes_recv), o.saturating_add(io.bytes_sent))
            });

        let rates = self.estimator.ingest(
            Instant::now(),
            Counters {
                disk_read,
                disk_write,
                net_in,
                net_out,
            },
        );

        tracing::debug!(
            disk_read_rate = rates.disk_read,
            disk_write_rate = rates.disk_write,
            net_in_rate = rates.net_in,
            net_out_rate = rates.net_out,
            "sampled node metrics"
        );

        Ok(NodeMetrics {
            memory_used: to_mib(memory.used),
            memory_total: to_mib(memory.total),
            swap_used: to_mib(swap.used),
            swap_total: to_mib(swap.total),

            disk_used: to_mib(disk.used),
            disk_total: to_mib(disk.total),
            disk_read: to_mib(disk_read),
            disk_write: to_mib(disk_write),
            disk_read_rate: rates.disk_read,
            disk_write_rate: rates.disk_write,

            net_in: to_mib(net_in),
            net_out: to_mib(net_out),
            net_in_rate: rates.net_in,
            net_out_rate: rates.net_out,

            cpu_used,
            cpu_threads,
            cpu_model,
        })
    }
}
