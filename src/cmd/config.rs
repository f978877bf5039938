//! Configuration view and validation commands: `odoo-panel config`.

use anyhow::Result;

use super::super::ConfigCommands;
use super::CmdContext;
use odoo_panel::panel_config::PanelToml;

pub fn cmd_config(ctx: &CmdContext, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = &ctx.config.config_path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Panel Configuration");
            println!("===================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No panel.toml found at {}", config_path.display());
                println!("Using default configuration:");
            }
            println!();
            print!("{}", toml::to_string_pretty(&ctx.config.toml)?);
            println!();

            // Effective values (including env/CLI overrides)
            println!("Effective values (with env/CLI overrides):");
            println!("  api_url = \"{}\"", ctx.config.api_url());
            println!("  dev_root = \"{}\"", ctx.config.dev_root());
            println!("  session = \"{}\"", ctx.sessions.path().display());
            println!();

            if !config_path.exists() {
                println!("Run 'odoo-panel config init' to create a panel.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No panel.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = PanelToml::load(config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("panel.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            PanelToml::default().save(config_path)?;

            println!("Created panel.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, request_timeout_secs");
            println!("  - [github] dev_root, success_grace_ms");
            println!("  - [instances] domain_suffix");
            println!("  - [metrics] refresh_secs, history_minutes");
            println!();
        }
        Some(ConfigCommands::Path) => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
