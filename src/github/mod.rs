//! GitHub integration for instance working trees.
//!
//! - `repo_url`: repository URL and token format helpers
//! - `workflow`: the connect-and-operate state machine

pub mod repo_url;
pub mod workflow;

pub use repo_url::{looks_like_github_token, parse_repo_url};
pub use workflow::{ConnectForm, ConnectStep, DEFAULT_SUCCESS_GRACE, Feedback, GitHubWorkflow, GitPanel};
