use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

mod cmd;

const DEFAULT_LOG_FILTER: &str = "taskboard=info,tower_http=info";

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Lightweight project task board")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding .taskboard/ (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (default from taskboard.toml, else 3141)
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind
        #[arg(long)]
        host: Option<String>,

        /// Path to the SQLite database
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Dev mode: permissive CORS, bind all interfaces
        #[arg(long)]
        dev: bool,

        /// Open a browser once the server is up
        #[arg(long)]
        open: bool,
    },
    /// Create the database and a default taskboard.toml
    Init {
        /// Path to the SQLite database
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,

        /// Path to the SQLite database
        #[arg(long, global = true)]
        db_path: Option<PathBuf>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ProjectCommands {
    /// Create a project
    Add {
        /// Short key used as task id prefix (e.g. JIRA)
        #[arg(long)]
        key: String,

        #[arg(long)]
        name: String,

        /// Member as id:Name (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,

        /// GitHub repository (owner/repo or URL)
        #[arg(long)]
        github: Option<String>,
    },
    /// List projects
    List,
    /// Show one project
    Show { id: i64 },
    /// Add a member (id:Name) to a project
    AddMember { id: i64, member: String },
    /// Link a GitHub repository, or unlink with --clear
    SetRepo {
        id: i64,

        /// GitHub repository (owner/repo or URL)
        github: Option<String>,

        #[arg(long, conflicts_with = "github")]
        clear: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
}

/// Install the global subscriber. The guard must live as long as `main`.
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default = if cli.verbose {
        "taskboard=debug,tower_http=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stderr_layer = if cli.log_json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "taskboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(&cli)?;

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Serve {
            port,
            host,
            db_path,
            dev,
            open,
        } => {
            cmd::cmd_serve(
                &project_dir,
                cmd::ServeArgs {
                    port: *port,
                    host: host.clone(),
                    db_path: db_path.clone(),
                    dev: *dev,
                    open: *open,
                },
            )
            .await?;
        }
        Commands::Init { db_path } => cmd::cmd_init(&project_dir, db_path.as_deref())?,
        Commands::Project { command, db_path } => {
            cmd::cmd_project(&project_dir, db_path.as_deref(), command.clone())?
        }
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
