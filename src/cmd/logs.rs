//! Action log commands: `odoo-panel logs [list|stats]`.

use anyhow::Result;

use super::super::LogsCommands;
use super::CmdContext;
use odoo_panel::ui::render;
use panel_common::LogQuery;

pub async fn cmd_logs(ctx: &CmdContext, command: Option<LogsCommands>) -> Result<()> {
    let client = ctx.authed_client()?;
    let default_hours = ctx.config.toml.logs.default_hours;

    match command {
        None => {
            let query = LogQuery::default().with_hours(default_hours);
            let entries = ctx.checked(client.action_logs(&query).await, "Failed to load logs")?;
            print!("{}", render::log_entries(&entries, render::term_width()));
        }
        Some(LogsCommands::List {
            instance,
            action,
            hours,
        }) => {
            let mut query = LogQuery::default().with_hours(hours.unwrap_or(default_hours));
            if let Some(instance) = instance {
                query = query.with_instance(instance);
            }
            if let Some(action) = action {
                query = query.with_action(action);
            }
            let entries = ctx.checked(client.action_logs(&query).await, "Failed to load logs")?;
            print!("{}", render::log_entries(&entries, render::term_width()));
        }
        Some(LogsCommands::Stats { hours }) => {
            let hours = hours.unwrap_or(default_hours);
            let stats = ctx.checked(client.log_stats(hours).await, "Failed to load log statistics")?;
            print!("{}", render::log_stats(&stats, hours));
        }
    }
    Ok(())
}
