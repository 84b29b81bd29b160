//! leetlens - LeetCode profile data from the command line
//!
//! Main entry point for the leetlens CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod app;
mod commands;

use commands::{batch, config, problems, profile, user};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// leetlens - LeetCode profile data from the command line
#[derive(Parser)]
#[command(name = "leetlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this config file instead of discovering one
    #[arg(long, global = true, env = "LEETLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Continue without a session token if none can be obtained
    #[arg(long, global = true)]
    pub anonymous: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a user's profile summary
    Profile(profile::ProfileArgs),

    /// Fetch one kind of user data as JSON
    User(user::UserArgs),

    /// List problems from the problem set
    Problems(problems::ProblemsArgs),

    /// Fetch several profiles through one session
    Batch(batch::BatchArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "leetlens=debug,leetlens_client=debug,leetlens_cache=debug,leetlens_config=debug,info"
    } else {
        "leetlens=info,leetlens_client=warn,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    // Logs go to stderr so stdout stays clean for command output
    use tracing_subscriber::prelude::*;
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    if cli.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        anonymous: cli.anonymous,
        config_path: cli.config,
    };

    match cli.command {
        Commands::Profile(args) => profile::run(args, &ctx).await,
        Commands::User(args) => user::run(args, &ctx).await,
        Commands::Problems(args) => problems::run(args, &ctx).await,
        Commands::Batch(args) => batch::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
