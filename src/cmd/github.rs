//! GitHub commands: `odoo-panel github connect|status|commit|push|pull`.

use anyhow::{Result, bail};
use console::style;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use super::super::GithubCommands;
use super::CmdContext;
use odoo_panel::api::PanelClient;
use odoo_panel::errors::WorkflowError;
use odoo_panel::github::{ConnectStep, Feedback, GitHubWorkflow};
use odoo_panel::ui::{BusySpinner, render, step_label};

pub async fn cmd_github(ctx: &CmdContext, command: GithubCommands) -> Result<()> {
    let client = ctx.authed_client()?;
    // Fail fast on an expired session; the workflow itself treats lookup
    // failures as "not linked".
    ctx.checked(client.current_user().await, "Failed to verify the session")?;

    match command {
        GithubCommands::Connect {
            instance,
            token,
            repo,
        } => connect(ctx, client, &instance, token, repo).await,
        GithubCommands::Status { instance } => {
            let wf = open_linked(ctx, client, &instance).await?;
            print_panel(&wf);
            Ok(())
        }
        GithubCommands::Commit { instance, message } => {
            let mut wf = open_linked(ctx, client, &instance).await?;
            wf.set_commit_message(message);
            run_git(ctx, &mut wf, GitAction::Commit).await
        }
        GithubCommands::Push { instance } => {
            let mut wf = open_linked(ctx, client, &instance).await?;
            run_git(ctx, &mut wf, GitAction::Push).await
        }
        GithubCommands::Pull { instance } => {
            let mut wf = open_linked(ctx, client, &instance).await?;
            run_git(ctx, &mut wf, GitAction::Pull).await
        }
    }
}

fn workflow(ctx: &CmdContext, client: PanelClient) -> GitHubWorkflow<PanelClient> {
    GitHubWorkflow::new(client)
        .with_dev_root(ctx.config.dev_root())
        .with_success_grace(ctx.config.success_grace())
}

async fn open_linked(
    ctx: &CmdContext,
    client: PanelClient,
    instance: &str,
) -> Result<GitHubWorkflow<PanelClient>> {
    let mut wf = workflow(ctx, client);
    wf.open(instance).await?;
    if wf.session_expired() {
        return Err(ctx.expire_session());
    }
    if wf.git_panel().is_none() {
        bail!(
            "{} has no linked repository. Run `odoo-panel github connect {}` first.",
            instance,
            instance
        );
    }
    Ok(wf)
}

fn print_panel(wf: &GitHubWorkflow<PanelClient>) {
    let Some(panel) = wf.git_panel() else {
        return;
    };
    println!("{}", render::repository_link(&panel.link));
    if let Some(path) = &panel.link.local_path {
        println!("  {}", style(path).dim());
    }
    match &panel.status {
        Some(status) => print!("{}", render::repository_status(status)),
        None => println!("{}", style("Repository status unavailable.").yellow()),
    }
}

#[derive(Clone, Copy)]
enum GitAction {
    Commit,
    Push,
    Pull,
}

async fn run_git(
    ctx: &CmdContext,
    wf: &mut GitHubWorkflow<PanelClient>,
    action: GitAction,
) -> Result<()> {
    let label = match action {
        GitAction::Commit => "Committing...",
        GitAction::Push => "Pushing...",
        GitAction::Pull => "Pulling...",
    };
    let spinner = BusySpinner::start("Git", label);
    let outcome = match action {
        GitAction::Commit => wf.commit().await,
        GitAction::Push => wf.push().await,
        GitAction::Pull => wf.pull().await,
    };
    if let Err(e) = outcome {
        spinner.clear();
        return Err(e.into());
    }
    if wf.session_expired() {
        spinner.finish_err("Session expired");
        return Err(ctx.expire_session());
    }

    let feedback = wf.git_panel().and_then(|panel| panel.feedback.clone());
    match feedback {
        Some(Feedback::Success(message)) => {
            spinner.finish_ok(message);
            print_panel(wf);
            Ok(())
        }
        Some(Feedback::Error(message)) => {
            spinner.finish_err(&message);
            bail!(message)
        }
        None => {
            spinner.clear();
            Ok(())
        }
    }
}

async fn connect(
    ctx: &CmdContext,
    client: PanelClient,
    instance: &str,
    token: Option<String>,
    repo: Option<String>,
) -> Result<()> {
    let spinner = BusySpinner::start("GitHub", format!("Checking {}...", instance));
    let observer = spinner.clone();
    let mut wf = workflow(ctx, client).on_transition(move |step| {
        if let Some(label) = step_label(step) {
            observer.set_message(label);
        }
    });

    wf.open(instance).await?;
    if wf.session_expired() {
        spinner.finish_err("Session expired");
        return Err(ctx.expire_session());
    }
    if wf.git_panel().is_some() {
        spinner.finish_ok(format!("{} is already linked", instance));
        print_panel(&wf);
        return Ok(());
    }
    spinner.clear();

    let theme = ColorfulTheme::default();
    let token = match token {
        Some(token) => token,
        None => Password::with_theme(&theme)
            .with_prompt("GitHub token")
            .interact()?,
    };
    let repo = match repo {
        Some(repo) => repo,
        None => Input::with_theme(&theme)
            .with_prompt("Repository URL")
            .interact_text()?,
    };
    wf.set_token(token);
    wf.set_repo_url(repo);

    let spinner = BusySpinner::start("GitHub", "Connecting...");
    let observer = spinner.clone();
    let mut wf = wf.on_transition(move |step| {
        if let Some(label) = step_label(step) {
            observer.set_message(label);
        }
    });

    let cancel = wf.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    let outcome = wf.submit().await;
    ctrl_c.abort();

    match outcome {
        Ok(()) if wf.session_expired() => {
            spinner.finish_err("Session expired");
            return Err(ctx.expire_session());
        }
        Ok(()) => {}
        Err(WorkflowError::Cancelled) => {
            wf.close();
            spinner.finish_err("Cancelled");
            bail!("Connection cancelled");
        }
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    }

    match wf.step().clone() {
        ConnectStep::Success { user, link } => {
            spinner.finish_ok(format!(
                "Connected as {} to {} on branch {}",
                user.name.as_deref().unwrap_or(&user.username),
                link.repo(),
                link.repo_branch
            ));
            wf.complete(|link| {
                if let Some(path) = &link.local_path {
                    println!("  Working tree: {}", style(path).dim());
                }
            })
            .await?;
            Ok(())
        }
        ConnectStep::Error { message } => {
            spinner.finish_err(&message);
            bail!(message)
        }
        _ => {
            let message = wf
                .form()
                .validation_error
                .clone()
                .unwrap_or_else(|| "Connection did not complete".to_string());
            spinner.finish_err(&message);
            bail!(message)
        }
    }
}
