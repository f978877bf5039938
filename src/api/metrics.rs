use super::client::PanelClient;
use crate::errors::PanelError;
use panel_common::{CurrentMetrics, MetricsHistory};

impl PanelClient {
    pub async fn current_metrics(&self) -> Result<CurrentMetrics, PanelError> {
        self.get("/api/metrics/current", &[]).await
    }

    /// Samples from the last `minutes` minutes, oldest first.
    pub async fn metrics_history(&self, minutes: u32) -> Result<MetricsHistory, PanelError> {
        self.get("/api/metrics/history", &[("minutes", minutes.to_string())])
            .await
    }
}
