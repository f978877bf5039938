//! Shared domain types for the Odoo server panel.
//!
//! Everything in this crate is pure: no I/O, no clocks, no global state. The
//! `odoo-panel` client crate layers REST facades and the GitHub workflow on top.

pub mod classifier;
pub mod confirm;
pub mod instance;
pub mod logs;
pub mod metrics;
pub mod repository;
pub mod user;

pub use classifier::{
    Partitioned, ProductionFilter, apply_all_filters, filter_by_production_instance,
    filter_by_search_term, production_names, separate_by_type,
};
pub use confirm::{InstanceAction, confirm_message, confirm_title};
pub use instance::{
    Instance, InstanceKind, NewProductionInstance, OdooEdition, OdooVersion, SslMethod,
    derived_production_name, sanitize_instance_name,
};
pub use logs::{
    ActionCount, ActionLogEntry, DEFAULT_LOG_HOURS, LOG_WINDOWS, LogQuery, LogStats, LogStatus,
};
pub use metrics::{CurrentMetrics, MetricsHistory, MetricsSample};
pub use repository::{
    DEFAULT_DEV_ROOT, FileChange, GitHubUser, NewRepositoryLink, RepoRef, RepositoryLink, RepositoryStatus,
    local_path_for,
};
pub use user::PanelUser;
