use serde::Deserialize;

use super::client::{Ack, PanelClient};
use crate::errors::PanelError;
use panel_common::{Instance, InstanceAction, NewProductionInstance};

#[derive(Debug, Deserialize)]
struct InstanceList {
    #[serde(default)]
    instances: Vec<Instance>,
}

impl PanelClient {
    pub async fn list_instances(&self) -> Result<Vec<Instance>, PanelError> {
        let list: InstanceList = self.get("/api/instances", &[]).await?;
        Ok(list.instances)
    }

    /// Create a production instance. The name must already be sanitized and
    /// non-empty.
    pub async fn create_production_instance(
        &self,
        request: &NewProductionInstance,
    ) -> Result<Ack, PanelError> {
        if !request.is_submittable() {
            return Err(PanelError::Validation(
                "Instance name is required (letters, digits and hyphens)".to_string(),
            ));
        }
        self.post("/api/instances/production", request).await
    }

    pub async fn run_instance_action(
        &self,
        instance_name: &str,
        action: InstanceAction,
    ) -> Result<Ack, PanelError> {
        let path = format!("/api/instances/{}/{}", instance_name, action.as_str());
        self.post_empty(&path).await
    }
}
