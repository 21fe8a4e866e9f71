//! Newsroom CLI
//!
//! Command-line interface for subscribing emails to Newsroom mailing lists,
//! against the real service or the local mock.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "newsroom")]
#[command(about = "Newsroom CLI - Manage newsletter subscriptions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file (defaults to NEWSROOM_* env vars)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the local mock service instead of the remote one
    #[arg(long, global = true)]
    mock: bool,

    /// Mock state file, loaded before and saved after each command
    #[arg(long, global = true, requires = "mock")]
    state_file: Option<PathBuf>,

    /// Report failures as warnings instead of errors
    #[arg(long, global = true)]
    lenient: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe an email to one or more lists
    Subscribe {
        /// Subscriber email
        email: String,

        /// List ID (repeatable)
        #[arg(short, long = "list", required = true)]
        lists: Vec<String>,

        /// Related list ID, enrolled without being reported (repeatable)
        #[arg(short, long = "related")]
        related: Vec<String>,

        /// Preferred language code
        #[arg(long)]
        language: Option<String>,

        /// Topic identifier (repeatable)
        #[arg(short, long = "topic")]
        topics: Vec<String>,
    },

    /// Unsubscribe an email from one or more lists
    Unsubscribe {
        /// Subscriber email
        email: String,

        /// List ID (repeatable)
        #[arg(short, long = "list", required = true)]
        lists: Vec<String>,
    },

    /// Check whether an email is subscribed to any of the given lists
    Status {
        /// Subscriber email
        email: String,

        /// List ID (repeatable; none means any list of the universe)
        #[arg(short, long = "list")]
        lists: Vec<String>,
    },

    /// Print the request key derived for an email
    Key {
        /// Subscriber email
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("newsroom_cli=debug,newsroom_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("newsroom_cli=info,newsroom_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let config = commands::load_config(cli.config.as_deref())?;
    let session = commands::Session::open(config, cli.mock, cli.state_file, cli.lenient)?;

    // Dispatch commands
    let outcome = match cli.command {
        Commands::Subscribe {
            email,
            lists,
            related,
            language,
            topics,
        } => {
            commands::subscribe::run(&session, &email, lists, related, language, topics, cli.verbose)
                .await
        }
        Commands::Unsubscribe { email, lists } => {
            commands::unsubscribe::run(&session, &email, &lists, cli.verbose).await
        }
        Commands::Status { email, lists } => {
            commands::status::run(&session, &email, &lists, cli.verbose).await
        }
        Commands::Key { email } => commands::key::run(session.config(), &email, cli.verbose),
    };

    // Mock state is kept even when the command failed half-way.
    session.close()?;
    outcome
}
