//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module       | Commands handled                          |
//! |--------------|-------------------------------------------|
//! | `auth`       | `Auth` (login, logout, whoami)            |
//! | `instances`  | `Instances` (list, create, action)        |
//! | `github`     | `Github` (connect, status, commit, push, pull) |
//! | `metrics`    | `Metrics` (current, history, watch)       |
//! | `logs`       | `Logs` (list, stats)                      |
//! | `backup`     | `Backup` (info, manager)                  |
//! | `config`     | `Config`                                  |

pub mod auth;
pub mod backup;
pub mod config;
pub mod github;
pub mod instances;
pub mod logs;
pub mod metrics;

pub use auth::{cmd_login, cmd_logout, cmd_whoami};
pub use backup::cmd_backup;
pub use config::cmd_config;
pub use github::cmd_github;
pub use instances::{cmd_instances_action, cmd_instances_create, cmd_instances_list};
pub use logs::cmd_logs;
pub use metrics::cmd_metrics;

use anyhow::{Context, Result, anyhow, bail};
use tracing::warn;

use odoo_panel::api::PanelClient;
use odoo_panel::errors::PanelError;
use odoo_panel::gates::ActionGate;
use odoo_panel::panel_config::PanelConfig;
use odoo_panel::session::SessionStore;

/// Everything a command needs: resolved configuration, the session store and
/// the confirmation gate.
pub struct CmdContext {
    pub config: PanelConfig,
    pub sessions: SessionStore,
    pub gate: ActionGate,
}

impl CmdContext {
    pub fn new(config: PanelConfig, assume_yes: bool) -> Result<Self> {
        let sessions =
            SessionStore::default_location().context("Failed to locate the session file")?;
        Ok(Self {
            config,
            sessions,
            gate: ActionGate::new(assume_yes),
        })
    }

    /// Client without credentials.
    pub fn client(&self) -> Result<PanelClient> {
        PanelClient::new(&self.config.api_url(), self.config.request_timeout())
            .context("Failed to build HTTP client")
    }

    /// Client carrying the stored session.
    pub fn authed_client(&self) -> Result<PanelClient> {
        let session = self
            .sessions
            .load()?
            .ok_or_else(|| anyhow!("Not logged in. Run `odoo-panel auth login` first."))?;

        let api_url = self.config.api_url();
        if !session.matches(&api_url) {
            warn!(session = %session.base_url, api = %api_url, "Stored session is for another backend");
            bail!(
                "The stored session belongs to {}. Run `odoo-panel auth login` for {}.",
                session.base_url,
                api_url
            );
        }
        Ok(self.client()?.with_session(session))
    }

    /// Attach context to a facade result. An expired session is removed
    /// from disk before reporting.
    pub fn checked<T>(&self, result: Result<T, PanelError>, what: &str) -> Result<T> {
        match result {
            Err(PanelError::Unauthorized) => Err(self.expire_session()),
            other => other.with_context(|| what.to_string()),
        }
    }

    /// Drop the stored session after the backend rejected its token.
    pub fn expire_session(&self) -> anyhow::Error {
        if let Err(e) = self.sessions.clear() {
            return anyhow::Error::new(e).context("Session expired and could not be removed");
        }
        anyhow!("Session expired. Run `odoo-panel auth login` to sign in again.")
    }
}
