//! Layered configuration for the panel client.
//!
//! Settings come from `panel.toml`, then environment variables, then CLI
//! flags; later layers win.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//! request_timeout_secs = 30
//!
//! [github]
//! dev_root = "/home/go/apps/develop/odoo-enterprise"
//! success_grace_ms = 2000
//!
//! [instances]
//! domain_suffix = "softrigx.com"
//!
//! [metrics]
//! refresh_secs = 5
//! history_minutes = 60
//!
//! [logs]
//! default_hours = 24
//!
//! [logging]
//! file = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use panel_common::{DEFAULT_DEV_ROOT, DEFAULT_LOG_HOURS, LOG_WINDOWS};

pub const CONFIG_FILE_NAME: &str = "panel.toml";
pub const APP_DIR_NAME: &str = "odoo-panel";

pub const ENV_CONFIG_PATH: &str = "ODOO_PANEL_CONFIG";
pub const ENV_API_URL: &str = "ODOO_PANEL_API_URL";
pub const ENV_DEV_ROOT: &str = "ODOO_PANEL_DEV_ROOT";

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Unset means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// GitHub integration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSection {
    /// Parent directory of development working trees on the panel host
    #[serde(default = "default_dev_root")]
    pub dev_root: String,
    /// Pause after a successful connection before the dialog resets
    #[serde(default = "default_success_grace_ms")]
    pub success_grace_ms: u64,
}

fn default_dev_root() -> String {
    DEFAULT_DEV_ROOT.to_string()
}

fn default_success_grace_ms() -> u64 {
    2000
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            dev_root: default_dev_root(),
            success_grace_ms: default_success_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstancesSection {
    /// Parent domain of production instances (`<name>.<domain_suffix>`)
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,
}

fn default_domain_suffix() -> String {
    "softrigx.com".to_string()
}

impl Default for InstancesSection {
    fn default() -> Self {
        Self {
            domain_suffix: default_domain_suffix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSection {
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_history_minutes")]
    pub history_minutes: u32,
}

fn default_refresh_secs() -> u64 {
    5
}

fn default_history_minutes() -> u32 {
    60
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            history_minutes: default_history_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsSection {
    #[serde(default = "default_log_hours")]
    pub default_hours: u32,
}

fn default_log_hours() -> u32 {
    DEFAULT_LOG_HOURS
}

impl Default for LogsSection {
    fn default() -> Self {
        Self {
            default_hours: default_log_hours(),
        }
    }
}

/// Diagnostics output of the client itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Also write a daily-rolling log file under the data directory
    #[serde(default)]
    pub file: bool,
}

/// The complete panel.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub instances: InstancesSection,
    #[serde(default)]
    pub metrics: MetricsSection,
    #[serde(default)]
    pub logs: LogsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl PanelToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse panel.toml")
    }

    /// Returns the default configuration if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize panel.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(format!(
                "api.base_url '{}' should start with http:// or https://",
                self.api.base_url
            ));
        }
        if self.api.request_timeout_secs == Some(0) {
            warnings.push("api.request_timeout_secs = 0 disables every request".to_string());
        }
        if !self.github.dev_root.starts_with('/') {
            warnings.push(format!(
                "github.dev_root '{}' is not an absolute path on the panel host",
                self.github.dev_root
            ));
        }
        if self.metrics.refresh_secs == 0 {
            warnings.push("metrics.refresh_secs must be at least 1".to_string());
        }
        if !LOG_WINDOWS.contains(&self.logs.default_hours) {
            warnings.push(format!(
                "logs.default_hours {} is not one of {:?}",
                self.logs.default_hours, LOG_WINDOWS
            ));
        }

        warnings
    }
}

/// Per-user directory that holds `panel.toml` and the stored session.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Resolve the config file: explicit path, then `$ODOO_PANEL_CONFIG`, then the
/// per-user default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Unified configuration: panel.toml merged with environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub config_path: PathBuf,
    pub toml: PanelToml,
    /// CLI override for the backend URL
    pub cli_api_url: Option<String>,
}

impl PanelConfig {
    /// Load the file (if any) and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        // A .env next to the working directory may carry ODOO_PANEL_* values.
        dotenvy::dotenv().ok();

        let config_path = resolve_config_path(explicit)?;
        let toml = PanelToml::load_or_default(&config_path)?;

        Ok(Self {
            config_path,
            toml,
            cli_api_url: None,
        })
    }

    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        self.cli_api_url = api_url;
        self
    }

    /// Backend URL (CLI → env → file), without a trailing slash.
    pub fn api_url(&self) -> String {
        let url = self
            .cli_api_url
            .clone()
            .or_else(|| std::env::var(ENV_API_URL).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| self.toml.api.base_url.clone());
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.toml.api.request_timeout_secs.map(Duration::from_secs)
    }

    /// Development root (env → file).
    pub fn dev_root(&self) -> String {
        std::env::var(ENV_DEV_ROOT)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.toml.github.dev_root.clone())
    }

    pub fn success_grace(&self) -> Duration {
        Duration::from_millis(self.toml.github.success_grace_ms)
    }

    pub fn metrics_refresh(&self) -> Duration {
        Duration::from_secs(self.toml.metrics.refresh_secs.max(1))
    }

    pub fn domain_suffix(&self) -> &str {
        &self.toml.instances.domain_suffix
    }
}
