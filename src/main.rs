mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use chronicle::config;

#[derive(Parser)]
#[command(name = "chronicle", version, about = "Session continuity for AI coding assistants")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
pub struct Scope {
    /// Project name (defaults to the project detected from the current directory)
    #[arg(long, short)]
    pub project: Option<String>,
    /// Only consider sessions captured in this worktree
    #[arg(long, short)]
    pub worktree: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List pending items for a project, oldest first
    Pending {
        #[command(flatten)]
        scope: Scope,
        /// Look-back window in days
        #[arg(long, short)]
        days: Option<i64>,
        /// Include resolved items
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// List stale pending items across the project's whole history
    Stale {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        json: bool,
    },
    /// Summarize the last session and outstanding work
    Catchup {
        #[command(flatten)]
        scope: Scope,
        #[arg(long, short)]
        days: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Propose (pending, accomplished) pairs that may be resolved
    Candidates {
        #[command(flatten)]
        scope: Scope,
        #[arg(long, short)]
        days: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Record a confirmed candidate as an automatic resolution
    Confirm {
        /// Pending item text
        pending: String,
        /// Accomplished item text that resolves it
        accomplished: String,
        #[arg(long, short)]
        project: Option<String>,
    },
    /// Mark a pending item as resolved
    Resolve {
        /// Pending item text
        text: String,
        #[arg(long, short)]
        project: Option<String>,
        /// What resolved it
        #[arg(long, short)]
        note: Option<String>,
    },
    /// Remove a resolution so the pending item shows again
    Undo {
        /// Pending item text
        text: String,
        #[arg(long, short)]
        project: Option<String>,
    },
    /// List all recorded resolutions
    Resolved {
        #[arg(long)]
        json: bool,
    },
    /// Show the detected project, worktree, and branch
    Context {
        /// Directory to inspect (defaults to the current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
    /// Validate block files and report quarantined records
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::ChronicleConfig::load()?;

    // Log to stderr so stdout stays clean for --json output.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Pending {
            scope,
            days,
            all,
            json,
        } => cli::pending::pending(&config, &scope, days, all, json),
        Command::Stale { scope, json } => cli::pending::stale(&config, &scope, json),
        Command::Catchup { scope, days, json } => {
            cli::catchup::catchup(&config, &scope, days, json)
        }
        Command::Candidates { scope, days, json } => {
            cli::resolve::candidates(&config, &scope, days, json)
        }
        Command::Confirm {
            pending,
            accomplished,
            project,
        } => cli::resolve::confirm(&config, &pending, &accomplished, project.as_deref()),
        Command::Resolve {
            text,
            project,
            note,
        } => cli::resolve::resolve(&config, &text, project.as_deref(), note.as_deref()),
        Command::Undo { text, project } => {
            cli::resolve::undo(&config, &text, project.as_deref())
        }
        Command::Resolved { json } => cli::resolve::resolved(&config, json),
        Command::Context { cwd } => cli::context(&config, cwd),
        Command::Check => cli::check::check(&config),
    }
}
