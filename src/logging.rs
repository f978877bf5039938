//! Diagnostics for the CLI itself.
//!
//! Filter: `$ODOO_PANEL_LOG` when set, else `warn` (`debug` for this crate
//! with `--verbose`). Output goes to stderr so that command output on stdout
//! stays pipeable. A daily-rolling file is added when `[logging] file = true`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::panel_config::APP_DIR_NAME;

pub const ENV_LOG_FILTER: &str = "ODOO_PANEL_LOG";
const LOG_FILE_PREFIX: &str = "odoo-panel.log";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub json: bool,
    /// Directory for the rolling log file; `None` disables it
    pub file_dir: Option<PathBuf>,
}

/// Default directory of the rolling log file.
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME).join("logs"))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,odoo_panel=debug,panel_common=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit,
/// or buffered file output is lost.
pub fn init(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options.verbose)));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    if options.json {
        layers.push(stderr.json().boxed());
    } else {
        layers.push(stderr.boxed());
    }

    let mut guard = None;
    if let Some(dir) = &options.file_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed(),
        );
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
