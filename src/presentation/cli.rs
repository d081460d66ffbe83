//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--json, --verbose, --project-dir, --config) are inherited by all subcommands
//! - `--stage` falls back to `deploy.stage` from the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Liftoff - incremental deployment orchestrator for serverless projects
#[derive(Parser, Debug)]
#[command(name = "liftoff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON events and a JSON result on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root (where liftoff.toml and the build directory live)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Configuration file (default: <project-dir>/liftoff.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create or update the stage stack and upload changed functions
    Deploy {
        /// Stage to deploy
        #[arg(short, long)]
        stage: Option<String>,

        /// Provider region
        #[arg(long)]
        region: Option<String>,

        /// Do not invoke the post-deploy functions
        #[arg(long)]
        skip_hooks: bool,
    },

    /// Empty the deployment bucket and delete the stage stack
    Destroy {
        /// Stage to destroy
        #[arg(short, long)]
        stage: Option<String>,

        /// Provider region
        #[arg(long)]
        region: Option<String>,
    },

    /// Show what deploy would upload, without changing anything
    Plan {
        /// Stage to plan
        #[arg(short, long)]
        stage: Option<String>,

        /// Provider region
        #[arg(long)]
        region: Option<String>,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Deploy { .. } => "deploy",
            Commands::Destroy { .. } => "destroy",
            Commands::Plan { .. } => "plan",
        }
    }
}
