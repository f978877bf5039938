//! Typed facades over the panel backend's REST endpoints.
//!
//! | Module | Endpoints |
//! |--------|-----------|
//! | `auth` | `/api/auth/login`, `/api/auth/me` |
//! | `instances` | `/api/instances`, `/api/instances/production`, `/api/instances/{name}/{action}` |
//! | `metrics` | `/api/metrics/current`, `/api/metrics/history` |
//! | `logs` | `/api/logs`, `/api/logs/stats` |
//! | `backup` | `/api/backup/info`, `/api/backup/manager` |
//! | `github` | `/api/github/*` |
//!
//! Every facade is an inherent method on [`PanelClient`]; the GitHub calls
//! are additionally exposed through the [`GitHubBackend`] trait.

mod auth;
mod backup;
mod client;
mod github;
mod instances;
mod logs;
mod metrics;

pub use backup::BackupInfo;
pub use client::{Ack, PanelClient};
pub use github::GitHubBackend;
