//! mdp - command-line client for the More Disruption Please API
//!
//! Main entry point for the mdp CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{profiles, request, token};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// mdp - call the athenahealth More Disruption Please API
#[derive(Parser)]
#[command(name = "mdp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    /// Config file (default: $MDP_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use (default: default-profile from the config)
    #[arg(short = 'P', long, global = true, env = "MDP_PROFILE")]
    pub profile: Option<String>,

    /// Practice ID, overriding the profile's
    #[arg(long, global = true)]
    pub practice: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a GET request
    Get(request::RequestArgs),

    /// Send a POST request
    Post(request::RequestArgs),

    /// Send a PUT request
    Put(request::RequestArgs),

    /// Send a DELETE request
    Delete(request::RequestArgs),

    /// Authenticate and show the issued token
    Token(token::TokenArgs),

    /// List configured profiles
    Profiles,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON.
    let filter = if cli.verbose {
        "mdp=debug,mdp_client=debug,mdp_config=debug,info"
    } else {
        "mdp=info,mdp_client=info,mdp_config=warn,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .init();

    // Create context for commands
    let ctx = commands::Context {
        config_path: cli.config,
        profile: cli.profile,
        practice: cli.practice,
        compact: cli.compact,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Get(args) => request::run(mdp_client::Verb::Get, args, &ctx).await,
        Commands::Post(args) => request::run(mdp_client::Verb::Post, args, &ctx).await,
        Commands::Put(args) => request::run(mdp_client::Verb::Put, args, &ctx).await,
        Commands::Delete(args) => request::run(mdp_client::Verb::Delete, args, &ctx).await,
        Commands::Token(args) => token::run(args, &ctx).await,
        Commands::Profiles => profiles::run(&ctx),
    }
}
