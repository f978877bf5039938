use serde::Deserialize;

use super::client::PanelClient;
use crate::errors::PanelError;
use panel_common::{ActionLogEntry, LogQuery, LogStats};

#[derive(Debug, Deserialize)]
struct LogList {
    #[serde(default)]
    logs: Vec<ActionLogEntry>,
}

impl PanelClient {
    /// Action log entries matching `query`, newest first.
    pub async fn action_logs(&self, query: &LogQuery) -> Result<Vec<ActionLogEntry>, PanelError> {
        let list: LogList = self.get("/api/logs", &query.to_params()).await?;
        Ok(list.logs)
    }

    pub async fn log_stats(&self, hours: u32) -> Result<LogStats, PanelError> {
        self.get("/api/logs/stats", &[("hours", hours.to_string())])
            .await
    }
}
