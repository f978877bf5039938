//! Dashboard commands: `odoo-panel metrics [current|history|watch]`.

use std::time::Duration;

use anyhow::Result;
use console::{Term, style};
use tokio_util::sync::CancellationToken;

use super::super::MetricsCommands;
use super::CmdContext;
use odoo_panel::dashboard::{fetch_frame, watch};
use odoo_panel::ui::{BusySpinner, render};

pub async fn cmd_metrics(ctx: &CmdContext, command: Option<MetricsCommands>) -> Result<()> {
    let client = ctx.authed_client()?;
    let history_minutes = ctx.config.toml.metrics.history_minutes;

    match command {
        None | Some(MetricsCommands::Current) => {
            let spinner = BusySpinner::start("Metrics", "Loading...");
            let frame = fetch_frame(&client, history_minutes).await;
            spinner.clear();
            let frame = ctx.checked(frame, "Failed to load metrics")?;
            print!("{}", render::dashboard(&frame));
        }
        Some(MetricsCommands::History { minutes }) => {
            let minutes = minutes.unwrap_or(history_minutes);
            let history = ctx.checked(
                client.metrics_history(minutes).await,
                "Failed to load metrics history",
            )?;
            println!("{} sample(s) over the last {} minute(s)", history.metrics.len(), minutes);
            for sample in &history.metrics {
                println!(
                    "  {:<26} cpu {:>5.1}%  ram {:>5.1}%  disk {:>5.1}%",
                    sample.timestamp.as_deref().unwrap_or("-"),
                    sample.cpu_percent.unwrap_or_default(),
                    sample.ram_percent.unwrap_or_default(),
                    sample.disk_percent.unwrap_or_default(),
                );
            }
        }
        Some(MetricsCommands::Watch { interval }) => {
            let every = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| ctx.config.metrics_refresh());

            let cancel = CancellationToken::new();
            let stopper = cancel.clone();
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stopper.cancel();
                }
            });

            let term = Term::stdout();
            let outcome = watch(&client, history_minutes, every, cancel, |frame| {
                let _ = term.clear_screen();
                match frame {
                    Ok(frame) => print!("{}", render::dashboard(frame)),
                    Err(e) => println!("{}", style(format!("Refresh failed: {}", e)).red()),
                }
                println!("{}", style("Ctrl-C to stop").dim());
            })
            .await;
            ctrl_c.abort();
            ctx.checked(outcome, "Metrics watch failed")?;
        }
    }
    Ok(())
}
