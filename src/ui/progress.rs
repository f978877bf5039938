use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui::icons::{CHECK, CROSS};
use crate::github::ConnectStep;

/// Indeterminate busy indicator shown while a backend call is in flight.
///
/// Hidden automatically when stderr is not a terminal. Clones drive the
/// same spinner.
#[derive(Clone)]
pub struct BusySpinner {
    bar: ProgressBar,
}

impl BusySpinner {
    /// Start spinning with a 100 ms tick.
    pub fn start(prefix: &str, message: impl Into<String>) -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style);
        bar.set_prefix(prefix.to_string());
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn finish_ok(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        println!("{}{}", CHECK, style(message.as_ref()).green());
    }

    pub fn finish_err(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        eprintln!("{}{}", CROSS, style(message.as_ref()).red());
    }

    /// Stop without printing anything.
    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}

/// Progress wording for the in-flight connect steps.
pub fn step_label(step: &ConnectStep) -> Option<&'static str> {
    match step {
        ConnectStep::Verifying => Some("Verifying GitHub token..."),
        ConnectStep::Configuring { .. } => Some("Configuring repository..."),
        ConnectStep::GitActions(panel) if panel.busy => Some("Running git operation..."),
        _ => None,
    }
}
