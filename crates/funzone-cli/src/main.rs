//! Funzone CLI - load web bundles from the command line.
//!
//! Resolves the configuration, builds a loader over the configured source and
//! writes the rendered document of a bundle to stdout or a file.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod context;
mod surface;
mod theme;

use commands::{config, doctor, list, load};
use context::LoaderContext;

/// Funzone - web bundle loader
#[derive(Parser)]
#[command(name = "funzone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace directory to read `.funzone/config.toml` from
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the bundle catalog
    List,

    /// Load a bundle and print the rendered document
    Load {
        /// Bundle id
        id: String,

        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Load the last-opened bundle
    Resume {
        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Forget the last-opened bundle
    Forget,

    /// Check every bundle resource
    Doctor,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the resolved configuration
    Show,
    /// Print config file and preference paths
    Paths,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace_root = cli.workspace.clone().or_else(|| std::env::current_dir().ok());
    let resolved = funzone_config::Config::load(workspace_root.as_deref())
        .context("failed to load configuration")?;

    let mut log_config = config_bridge::to_log_config(&resolved.config);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = funzone_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => config::show_config(&resolved),
            ConfigCommands::Paths => config::show_paths(&resolved),
        },
        Commands::List => {
            let ctx = LoaderContext::build(&resolved.config).await?;
            let last = ctx.last_opened.load().await.ok().flatten();
            list::list_bundles(ctx.controller.catalog(), last.as_ref().map(|id| id.as_str()));
            Ok(())
        },
        Commands::Load { id, out } => {
            let ctx = LoaderContext::build(&resolved.config).await?;
            load::load_bundle(&ctx, &id, out.as_deref()).await
        },
        Commands::Resume { out } => {
            let ctx = LoaderContext::build(&resolved.config).await?;
            load::resume(&ctx, out.as_deref()).await
        },
        Commands::Forget => {
            let ctx = LoaderContext::build(&resolved.config).await?;
            load::forget(&ctx).await
        },
        Commands::Doctor => {
            let ctx = LoaderContext::build(&resolved.config).await?;
            doctor::run_doctor(&ctx).await
        },
    }
}
