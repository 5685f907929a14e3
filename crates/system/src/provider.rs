use nodestat_core::{NodeError, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use sysinfo::{Disks, Networks, System};

/// Used / total pair, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub used: u64,
    pub total: u64,
}

/// Cumulative I/O of one block device since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskIo {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Cumulative traffic of one network interface since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetIo {
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuInfo {
    pub model_name: String,
}

/// Source of raw host figures.
///
/// Every call may fail with [`NodeError::MetricsUnavailable`]; callers do not
/// retry.
pub trait MetricsProvider: Send + Sync {
    fn memory(&self) -> Result<Usage>;

    fn swap(&self) -> Result<Usage>;

    /// Usage of the filesystem that holds `path`.
    fn disk_usage(&self, path: &Path) -> Result<Usage>;

    fn disk_io_counters(&self) -> Result<Vec<DiskIo>>;

    fn cpu_info(&self) -> Result<Vec<CpuInfo>>;

    /// Global CPU usage since the previous call, nominally in `[0, 100]`.
    fn cpu_percent(&self) -> Result<f64>;

    fn cpu_thread_count(&self) -> Result<usize>;

    /// Per-interface cumulative counters.
    fn network_io_counters(&self) -> Result<Vec<NetIo>>;
}

struct Probe {
    sys: System,
    disks: Disks,
    networks: Networks,
}

/// [`MetricsProvider`] backed by `sysinfo`.
///
/// Keeps one set of sysinfo handles alive so CPU usage is measured against
/// the previous refresh rather than from scratch.
pub struct SysinfoProvider {
    probe: Mutex<Probe>,
}

impl SysinfoProvider {
    pub fn new() -> Result<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(NodeError::unavailable(
                "sysinfo does not support this operating system",
            ));
        }

        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        Ok(Self {
            probe: Mutex::new(Probe {
                sys,
                disks: Disks::new_with_refreshed_list(),
                networks: Networks::new_with_refreshed_list(),
            }),
        })
    }
}

impl std::fmt::Debug for SysinfoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoProvider").finish_non_exhaustive()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn memory(&self) -> Result<Usage> {
        let mut probe = self.probe.lock();
        probe.sys.refresh_memory();
        let total = probe.sys.total_memory();
        if total == 0 {
            return Err(NodeError::unavailable("total memory reported as zero"));
        }
        Ok(Usage {
            used: probe.sys.used_memory(),
            total,
        })
    }

    fn swap(&self) -> Result<Usage> {
        let mut probe = self.probe.lock();
        probe.sys.refresh_memory();
        // Hosts without swap legitimately report 0 / 0.
        Ok(Usage {
            used: probe.sys.used_swap(),
            total: probe.sys.total_swap(),
        })
    }

    fn disk_usage(&self, path: &Path) -> Result<Usage> {
        let mut probe = self.probe.lock();
        probe.disks.refresh(true);

        // The mount point that is the longest prefix of `path` owns it.
        probe
            .disks
            .list()
            .iter()
            .filter(|d| path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().components().count())
            .map(|d| Usage {
                used: d.total_space().saturating_sub(d.available_space()),
                total: d.total_space(),
            })
            .ok_or_else(|| {
                NodeError::unavailable(format!("no mounted disk holds '{}'", path.display()))
            })
    }

    fn disk_io_counters(&self) -> Result<Vec<DiskIo>> {
        let mut probe = self.probe.lock();
        probe.disks.refresh(true);

        // A device mounted at several points is listed once per mount.
        let mut seen = HashSet::new();
        Ok(probe
            .disks
            .list()
            .iter()
            .filter(|d| seen.insert(d.name().to_os_string()))
            .map(|d| {
                let usage = d.usage();
                DiskIo {
                    read_bytes: usage.total_read_bytes,
                    write_bytes: usage.total_written_bytes,
                }
            })
            .collect())
    }

    fn cpu_info(&self) -> Result<Vec<CpuInfo>> {
        let probe = self.probe.lock();
        Ok(probe
            .sys
            .cpus()
            .iter()
            .map(|c| CpuInfo {
                model_name: c.brand().trim().to_string(),
            })
            .collect())
    }

    fn cpu_percent(&self) -> Result<f64> {
        let mut probe = self.probe.lock();
        probe.sys.refresh_cpu_usage();
        Ok(f64::from(probe.sys.global_cpu_usage()))
    }

    fn cpu_thread_count(&self) -> Result<usize> {
        let probe = self.probe.lock();
        match probe.sys.cpus().len() {
            0 => Err(NodeError::unavailable("no logical CPUs reported")),
            n => Ok(n),
        }
    }

    fn network_io_counters(&self) -> Result<Vec<NetIo>> {
        let mut probe = self.probe.lock();
        probe.networks.refresh(true);
        Ok(probe
            .networks
            .iter()
            .map(|(_, data)| NetIo {
                bytes_recv: data.total_received(),
                bytes_sent: data.total_transmitted(),
            })
            .collect())
    }
}
