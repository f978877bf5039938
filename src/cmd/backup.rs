//! Backup commands: `odoo-panel backup [info|manager]`.

use anyhow::{Context, Result, anyhow};

use super::super::BackupCommands;
use super::CmdContext;
use odoo_panel::panel_config::APP_DIR_NAME;
use odoo_panel::ui::{BusySpinner, render};

const MANAGER_FILE_NAME: &str = "backup-manager.html";

pub async fn cmd_backup(ctx: &CmdContext, command: Option<BackupCommands>) -> Result<()> {
    let client = ctx.authed_client()?;

    match command {
        None | Some(BackupCommands::Info) => {
            let info = ctx.checked(client.backup_info().await, "Failed to load backup info")?;
            print!("{}", render::backup_info(&info));
        }
        Some(BackupCommands::Manager { no_open }) => {
            let spinner = BusySpinner::start("Backup", "Fetching backup manager...");
            let html = client.backup_manager_html().await;
            spinner.clear();
            let html = ctx.checked(html, "Failed to load the backup manager")?;

            let dir = dirs::cache_dir()
                .ok_or_else(|| anyhow!("Could not determine the cache directory"))?
                .join(APP_DIR_NAME);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = dir.join(MANAGER_FILE_NAME);
            std::fs::write(&path, html)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!("Saved backup manager to {}", path.display());
            if !no_open {
                open::that(&path)
                    .with_context(|| format!("Failed to open {} in a browser", path.display()))?;
            }
        }
    }
    Ok(())
}
