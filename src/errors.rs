//! Typed error hierarchy for the panel client.
//!
//! Three enums cover the three layers:
//! - `PanelError`: REST facade failures (validation, remote, transport)
//! - `WorkflowError`: misuse of a GitHub workflow session
//! - `ConfigError`: configuration and session file loading

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the REST facades.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a structured failure.
    #[error("Backend rejected the request ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Remote { status: u16, message: Option<String> },

    #[error("Session expired or missing; log in again")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend could not be reached or answered with something unparseable.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Request cancelled")]
    Cancelled,
}

impl PanelError {
    /// Message to show next to the failed action: the backend's own wording
    /// when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PanelError::Validation(msg) => msg.clone(),
            PanelError::Remote {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PanelError::Unauthorized)
    }
}

impl From<reqwest::Error> for PanelError {
    fn from(err: reqwest::Error) -> Self {
        PanelError::Transport(Box::new(err))
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        PanelError::Transport(Box::new(err))
    }
}

/// Errors from driving a GitHub workflow session in the wrong state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("No workflow session is open")]
    NotOpen,

    #[error("Instance {instance} has no linked repository")]
    NotLinked { instance: String },

    #[error("A git operation is already running for {instance}")]
    Busy { instance: String },

    #[error("Cannot {action} while the workflow is {step}")]
    InvalidStep { action: &'static str, step: &'static str },

    #[error("Workflow session was closed")]
    Cancelled,
}

/// Errors from loading configuration or the stored session.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_prefers_backend_message() {
        let err = PanelError::Remote {
            status: 400,
            message: Some("Repository already configured".to_string()),
        };
        assert_eq!(err.user_message("fallback"), "Repository already configured");
    }

    #[test]
    fn remote_error_without_message_uses_fallback() {
        let err = PanelError::Remote {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("Failed to push"), "Failed to push");
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn blank_remote_message_uses_fallback() {
        let err = PanelError::Remote {
            status: 200,
            message: Some("  ".to_string()),
        };
        assert_eq!(err.user_message("Failed to pull"), "Failed to pull");
    }

    #[test]
    fn unauthorized_is_matchable() {
        let err = PanelError::Unauthorized;
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message("x"), "x");
    }

    #[test]
    fn decode_failure_is_transport() {
        let err: PanelError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, PanelError::Transport(_)));
        assert_eq!(err.user_message("Could not load"), "Could not load");
    }

    #[test]
    fn workflow_error_carries_instance() {
        let err = WorkflowError::NotLinked {
            instance: "cliente1".to_string(),
        };
        assert!(err.to_string().contains("cliente1"));
    }

    #[test]
    fn config_error_parse_carries_path() {
        let err = ConfigError::Parse {
            path: PathBuf::from("/etc/panel.toml"),
            message: "expected table".to_string(),
        };
        match &err {
            ConfigError::Parse { path, .. } => assert_eq!(path, &PathBuf::from("/etc/panel.toml")),
            _ => panic!("Expected Parse"),
        }
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&PanelError::Cancelled);
        assert_std_error(&WorkflowError::Cancelled);
        assert_std_error(&ConfigError::NoConfigDir);
    }
}
