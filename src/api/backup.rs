use serde::{Deserialize, Serialize};

use super::client::PanelClient;
use crate::errors::PanelError;

/// Where the backup manager of the production server lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupInfo {
    #[serde(default)]
    pub production_url: Option<String>,
    #[serde(default)]
    pub manager_path: Option<String>,
    pub full_url: String,
}

impl PanelClient {
    pub async fn backup_info(&self) -> Result<BackupInfo, PanelError> {
        self.get("/api/backup/info", &[]).await
    }

    /// The backup manager page, proxied by the backend as raw HTML.
    pub async fn backup_manager_html(&self) -> Result<String, PanelError> {
        self.get_text("/api/backup/manager").await
    }
}
