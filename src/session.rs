//! Authenticated session handling.
//!
//! A [`Session`] exists only after a successful login. It is passed explicitly
//! to [`crate::api::PanelClient`]; there is no process-wide token slot. The
//! [`SessionStore`] persists it between CLI invocations and removes it on
//! logout or when the backend answers 401.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::panel_config::config_dir;
use panel_common::PanelUser;

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    /// Backend the token was issued by
    pub base_url: String,
    pub access_token: String,
    pub user: PanelUser,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>, user: PanelUser) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            user,
            created_at: Utc::now(),
        }
    }

    /// Whether this session was issued by the backend at `base_url`.
    pub fn matches(&self, base_url: &str) -> bool {
        self.base_url.trim_end_matches('/') == base_url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Open `path` for writing, truncated, readable by the owner only. A file
/// left over with wider permissions is narrowed before anything is written.
fn open_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let file = options.open(path)?;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        Ok(file)
    }
    #[cfg(not(unix))]
    {
        options.open(path)
    }
}

/// File-backed session persistence.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the per-user config directory.
    pub fn default_location() -> Result<Self, ConfigError> {
        Ok(Self::new(config_dir()?.join(SESSION_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<Session>, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let session = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(session).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let mut file = open_private(&self.path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;

        debug!(path = %self.path.display(), user = %session.user.username, "Session saved");
        Ok(())
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, ConfigError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session cleared");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ConfigError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
