//! Shapes returned by the metrics backend. Only fields the dashboard shows are
//! typed; everything numeric defaults to zero when absent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuMetrics {
    pub percent: f64,
    pub count: u32,
    pub count_logical: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryMetrics {
    pub total_gb: f64,
    pub available_gb: f64,
    pub used_gb: f64,
    pub percent: f64,
    pub swap_total_gb: f64,
    pub swap_used_gb: f64,
    pub swap_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskMetrics {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkMetrics {
    pub mb_sent: f64,
    pub mb_recv: f64,
    pub speed_mbps_sent: f64,
    pub speed_mbps_recv: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub hostname: String,
    pub platform: String,
    pub platform_release: String,
    pub uptime_formatted: String,
}

/// Body of `GET /api/metrics/current`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentMetrics {
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub disk: Vec<DiskMetrics>,
    pub network: NetworkMetrics,
    pub system: SystemInfo,
}

impl CurrentMetrics {
    /// The root partition if reported, otherwise the first one.
    pub fn primary_disk(&self) -> Option<&DiskMetrics> {
        self.disk
            .iter()
            .find(|d| d.mountpoint == "/")
            .or_else(|| self.disk.first())
    }
}

/// One point of `GET /api/metrics/history`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSample {
    pub timestamp: Option<String>,
    pub cpu_percent: Option<f64>,
    pub ram_percent: Option<f64>,
    pub disk_percent: Option<f64>,
    pub network_sent_mb: Option<f64>,
    pub network_recv_mb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsHistory {
    pub metrics: Vec<MetricsSample>,
    pub count: usize,
}

impl MetricsHistory {
    /// Mean CPU load over the samples that carry one.
    pub fn average_cpu(&self) -> Option<f64> {
        average(self.metrics.iter().filter_map(|m| m.cpu_percent))
    }

    pub fn average_ram(&self) -> Option<f64> {
        average(self.metrics.iter().filter_map(|m| m.ram_percent))
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
