use axum::extract::State;
use axum::Json;
use nodestat_core::{NodeError, NodeMetrics};
use serde::Serialize;
use tracing::instrument;

use crate::{ApiError, AppState};

/// Body of `GET /api/system/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStatsResponse {
    pub ram_used: u64,
    pub ram_total: u64,
    pub ram_percent: f64,
    pub swap_used: u64,
    pub swap_total: u64,
    pub swap_percent: f64,

    pub disk_used: u64,
    pub disk_total: u64,
    pub disk_percent: f64,
    pub disk_read: u64,
    pub disk_write: u64,
    pub disk_read_rate: f64,
    pub disk_write_rate: f64,

    pub net_in: u64,
    pub net_out: u64,
    pub net_in_rate: f64,
    pub net_out_rate: f64,

    pub cpu_used: f64,
    pub cpu_threads: usize,
    pub cpu_model: String,
}

impl From<NodeMetrics> for NodeStatsResponse {
    fn from(m: NodeMetrics) -> Self {
        Self {
            ram_percent: m.memory_percent(),
            swap_percent: m.swap_percent(),
            disk_percent: m.disk_percent(),

            ram_used: m.memory_used,
            ram_total: m.memory_total,
            swap_used: m.swap_used,
            swap_total: m.swap_total,

            disk_used: m.disk_used,
            disk_total: m.disk_total,
            disk_read: m.disk_read,
            disk_write: m.disk_write,
            disk_read_rate: m.disk_read_rate,
            disk_write_rate: m.disk_write_rate,

            net_in: m.net_in,
            net_out: m.net_out,
            net_in_rate: m.net_in_rate,
            net_out_rate: m.net_out_rate,

            cpu_used: m.cpu_used,
            cpu_threads: m.cpu_threads,
            cpu_model: m.cpu_model,
        }
    }
}

/// Take one snapshot of the node.
///
/// Sampling touches the filesystem, so it runs on the blocking pool.
#[instrument(skip_all)]
pub async fn get_node_stats(
    State(state): State<AppState>,
) -> Result<Json<NodeStatsResponse>, ApiError> {
    let monitor = state.monitor.clone();
    let metrics = tokio::task::spawn_blocking(move || monitor.snapshot())
        .await
        .map_err(|e| NodeError::unavailable(format!("sampling task failed: {e}")))??;

    Ok(Json(metrics.into()))
}
