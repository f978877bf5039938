use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use odoo_panel::logging::{self, LogOptions};
use odoo_panel::panel_config::PanelConfig;
use panel_common::{InstanceAction, LOG_WINDOWS, OdooEdition, OdooVersion, SslMethod};

mod cmd;

#[derive(Parser)]
#[command(name = "odoo-panel")]
#[command(version, about = "Terminal control panel for an Odoo server-management backend")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit diagnostics as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Answer yes to every confirmation prompt
    #[arg(long, global = true)]
    pub yes: bool,

    /// Path to panel.toml (defaults to $ODOO_PANEL_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL. Overrides panel.toml and $ODOO_PANEL_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in, log out, or show the current account
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List, create and operate Odoo instances
    Instances {
        #[command(subcommand)]
        command: InstancesCommands,
    },
    /// Connect an instance to GitHub and run git operations on it
    Github {
        #[command(subcommand)]
        command: GithubCommands,
    },
    /// Server metrics dashboard
    Metrics {
        #[command(subcommand)]
        command: Option<MetricsCommands>,
    },
    /// Action log viewer
    Logs {
        #[command(subcommand)]
        command: Option<LogsCommands>,
    },
    /// Backup manager launcher
    Backup {
        #[command(subcommand)]
        command: Option<BackupCommands>,
    },
    /// View, validate or create panel.toml
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum AuthCommands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the account of the stored session
    Whoami,
}

#[derive(Subcommand, Clone)]
pub enum InstancesCommands {
    /// List instances grouped by production and development
    List {
        /// Production instance to focus on ("all" for every one)
        #[arg(short, long, default_value = "all")]
        filter: String,
        /// Case-insensitive match on name, domain or database
        #[arg(short, long)]
        search: Option<String>,
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a production instance
    Create {
        /// Instance name; lowercased and stripped to letters, digits and hyphens
        name: String,
        #[arg(long, default_value = "19", value_parser = clap::value_parser!(OdooVersion))]
        version: OdooVersion,
        #[arg(long, default_value = "enterprise", value_parser = clap::value_parser!(OdooEdition))]
        edition: OdooEdition,
        #[arg(long, default_value = "letsencrypt", value_parser = clap::value_parser!(SslMethod))]
        ssl: SslMethod,
    },
    /// Run an action (restart, update-db, update-files, sync-filestore,
    /// regenerate-assets, delete) after confirmation
    Action {
        instance: String,
        #[arg(value_parser = clap::value_parser!(InstanceAction))]
        action: InstanceAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum GithubCommands {
    /// Link an instance to a GitHub repository
    Connect {
        instance: String,
        /// Personal access token (prompted when omitted)
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Repository URL, e.g. https://github.com/owner/repo
        #[arg(long)]
        repo: Option<String>,
    },
    /// Show the linked repository and uncommitted changes
    Status { instance: String },
    /// Commit every change in the working tree
    Commit {
        instance: String,
        #[arg(short, long)]
        message: String,
    },
    /// Push the instance branch
    Push { instance: String },
    /// Pull the instance branch
    Pull { instance: String },
}

#[derive(Subcommand, Clone)]
pub enum MetricsCommands {
    /// One dashboard frame
    Current,
    /// Recent samples
    History {
        #[arg(short, long)]
        minutes: Option<u32>,
    },
    /// Refresh the dashboard until Ctrl-C
    Watch {
        /// Refresh interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[derive(Subcommand, Clone)]
pub enum LogsCommands {
    /// Filtered action log
    List {
        #[arg(short, long)]
        instance: Option<String>,
        #[arg(short, long)]
        action: Option<String>,
        /// Time window: 1, 6, 24, 72 or 168 hours
        #[arg(long, value_parser = parse_log_hours)]
        hours: Option<u32>,
    },
    /// Success and error counts
    Stats {
        #[arg(long, value_parser = parse_log_hours)]
        hours: Option<u32>,
    },
}

#[derive(Subcommand, Clone)]
pub enum BackupCommands {
    /// Where the backup manager lives
    Info,
    /// Save the backup manager page and open it in the browser
    Manager {
        /// Only print the saved file path
        #[arg(long)]
        no_open: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default panel.toml
    Init,
    /// Print the resolved panel.toml path
    Path,
}

fn parse_log_hours(raw: &str) -> Result<u32, String> {
    let hours: u32 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number of hours", raw))?;
    if LOG_WINDOWS.contains(&hours) {
        Ok(hours)
    } else {
        Err(format!("hours must be one of {:?}", LOG_WINDOWS))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PanelConfig::load(cli.config.as_deref())?.with_api_url(cli.api_url.clone());

    let file_dir = if config.toml.logging.file {
        logging::default_log_dir()
    } else {
        None
    };
    let _log_guard = logging::init(&LogOptions {
        verbose: cli.verbose,
        json: cli.log_json,
        file_dir,
    })?;

    let ctx = cmd::CmdContext::new(config, cli.yes)?;

    match &cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Login { username } => cmd::cmd_login(&ctx, username.clone()).await?,
            AuthCommands::Logout => cmd::cmd_logout(&ctx)?,
            AuthCommands::Whoami => cmd::cmd_whoami(&ctx).await?,
        },
        Commands::Instances { command } => match command {
            InstancesCommands::List {
                filter,
                search,
                json,
            } => cmd::cmd_instances_list(&ctx, filter, search.as_deref(), *json).await?,
            InstancesCommands::Create {
                name,
                version,
                edition,
                ssl,
            } => cmd::cmd_instances_create(&ctx, name, *version, *edition, *ssl).await?,
            InstancesCommands::Action { instance, action } => {
                cmd::cmd_instances_action(&ctx, instance, *action).await?
            }
        },
        Commands::Github { command } => cmd::cmd_github(&ctx, command.clone()).await?,
        Commands::Metrics { command } => cmd::cmd_metrics(&ctx, command.clone()).await?,
        Commands::Logs { command } => cmd::cmd_logs(&ctx, command.clone()).await?,
        Commands::Backup { command } => cmd::cmd_backup(&ctx, command.clone()).await?,
        Commands::Config { command } => cmd::cmd_config(&ctx, command.clone())?,
    }

    Ok(())
}
