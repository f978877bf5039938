use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{Ack, PanelClient};
use crate::errors::PanelError;
use panel_common::{GitHubUser, NewRepositoryLink, RepositoryLink, RepositoryStatus};

/// Backend operations the GitHub workflow depends on.
///
/// [`PanelClient`] is the production implementation; tests drive the
/// workflow with an in-memory double.
#[async_trait]
pub trait GitHubBackend: Send + Sync {
    /// The instance's existing link, or `None` when it has none (a 404 or a
    /// `"success": false` reply).
    async fn get_config(&self, instance: &str) -> Result<Option<RepositoryLink>, PanelError>;

    async fn verify_token(&self, token: &str) -> Result<GitHubUser, PanelError>;

    async fn create_config(&self, link: &NewRepositoryLink) -> Result<(), PanelError>;

    async fn init_repo(&self, instance: &str) -> Result<(), PanelError>;

    async fn status(&self, instance: &str) -> Result<RepositoryStatus, PanelError>;

    async fn commit(&self, instance: &str, message: &str) -> Result<(), PanelError>;

    async fn push(&self, instance: &str) -> Result<(), PanelError>;

    async fn pull(&self, instance: &str) -> Result<(), PanelError>;
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    #[serde(default)]
    config: Option<RepositoryLink>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct CommitRequest<'a> {
    message: &'a str,
}

#[async_trait]
impl GitHubBackend for PanelClient {
    async fn get_config(&self, instance: &str) -> Result<Option<RepositoryLink>, PanelError> {
        match self
            .get::<ConfigResponse>(&format!("/api/github/config/{}", instance), &[])
            .await
        {
            Ok(response) => Ok(response.config),
            Err(PanelError::NotFound(_)) => Ok(None),
            // A 2xx with `"success": false` is the backend's "not configured".
            Err(PanelError::Remote { status, message }) if (200..300).contains(&status) => {
                debug!(
                    instance,
                    message = message.as_deref().unwrap_or_default(),
                    "No repository configured"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn verify_token(&self, token: &str) -> Result<GitHubUser, PanelError> {
        self.post("/api/github/verify", &VerifyRequest { token }).await
    }

    async fn create_config(&self, link: &NewRepositoryLink) -> Result<(), PanelError> {
        self.post::<_, Ack>("/api/github/config", link).await?;
        Ok(())
    }

    async fn init_repo(&self, instance: &str) -> Result<(), PanelError> {
        self.post_empty::<Ack>(&format!("/api/github/init/{}", instance))
            .await?;
        Ok(())
    }

    async fn status(&self, instance: &str) -> Result<RepositoryStatus, PanelError> {
        self.get(&format!("/api/github/status/{}", instance), &[])
            .await
    }

    async fn commit(&self, instance: &str, message: &str) -> Result<(), PanelError> {
        self.post::<_, Ack>(
            &format!("/api/github/commit/{}", instance),
            &CommitRequest { message },
        )
        .await?;
        Ok(())
    }

    async fn push(&self, instance: &str) -> Result<(), PanelError> {
        self.post_empty::<Ack>(&format!("/api/github/push/{}", instance))
            .await?;
        Ok(())
    }

    async fn pull(&self, instance: &str) -> Result<(), PanelError> {
        self.post_empty::<Ack>(&format!("/api/github/pull/{}", instance))
            .await?;
        Ok(())
    }
}
