//! Client library for the Odoo server panel backend.
//!
//! Pure domain logic (instance classification, confirmation wording, naming
//! conventions) lives in `panel-common`; this crate adds the REST facades,
//! the GitHub integration workflow, session persistence and terminal output.

pub mod api;
pub mod dashboard;
pub mod errors;
pub mod gates;
pub mod github;
pub mod logging;
pub mod panel_config;
pub mod session;
pub mod ui;

pub use errors::{ConfigError, PanelError, WorkflowError};
