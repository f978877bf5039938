//! Session commands: `odoo-panel auth login|logout|whoami`.

use anyhow::{Result, bail};
use console::style;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use super::CmdContext;
use odoo_panel::errors::PanelError;
use odoo_panel::ui::BusySpinner;

pub async fn cmd_login(ctx: &CmdContext, username: Option<String>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let username = match username {
        Some(name) => name,
        None => Input::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()?,
    };
    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .interact()?;

    let client = ctx.client()?;
    let spinner = BusySpinner::start("Auth", format!("Signing in to {}...", client.base_url()));
    let session = match client.login(&username, &password).await {
        Ok(session) => session,
        Err(PanelError::Remote { status: 401, message }) => {
            let message = message.unwrap_or_else(|| "Invalid credentials".to_string());
            spinner.finish_err(&message);
            bail!(message);
        }
        Err(e) => {
            spinner.finish_err("Login failed");
            return Err(e.into());
        }
    };

    ctx.sessions.save(&session)?;
    spinner.finish_ok(format!(
        "Logged in as {} ({})",
        session.user.username, session.user.role
    ));
    Ok(())
}

pub fn cmd_logout(ctx: &CmdContext) -> Result<()> {
    if ctx.sessions.clear()? {
        println!("Logged out.");
    } else {
        println!("No stored session.");
    }
    Ok(())
}

pub async fn cmd_whoami(ctx: &CmdContext) -> Result<()> {
    let client = ctx.authed_client()?;
    let user = ctx.checked(client.current_user().await, "Failed to load the current user")?;

    println!("{} ({})", style(&user.username).bold(), user.role);
    if let Some(session) = client.session() {
        println!("  Backend:   {}", session.base_url);
        println!(
            "  Signed in: {}",
            session.created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}
