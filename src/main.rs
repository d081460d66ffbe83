//! Liftoff CLI - incremental deployment orchestrator
//!
//! Usage: liftoff [OPTIONS] <COMMAND>
//!
//! Commands:
//!   deploy   Create or update the stage stack and upload changed functions
//!   destroy  Empty the deployment bucket and delete the stage stack
//!   plan     Show what deploy would upload

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use liftoff::domain::value_objects::CancellationFlag;
use liftoff::error::LiftoffError;
use liftoff::logging::init_logging;
use liftoff::presentation::cli::{Cli, Commands};

mod commands;

use commands::{cmd_deploy, cmd_destroy, cmd_plan, GlobalArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json);

    let cancel = CancellationFlag::new();
    let handle = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handle.cancel()) {
        warn!("could not install Ctrl-C handler: {}", err);
    }

    match run(cli, cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let retryable = err
                .downcast_ref::<LiftoffError>()
                .is_some_and(LiftoffError::is_retryable);
            if retryable {
                eprintln!("error: {:#} (re-running may succeed)", err);
            } else {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, cancel: CancellationFlag) -> Result<()> {
    let global = GlobalArgs {
        json: cli.json,
        verbose: cli.verbose,
        project_dir: cli.project_dir,
        config: cli.config,
    };

    match cli.command {
        Commands::Deploy {
            stage,
            region,
            skip_hooks,
        } => cmd_deploy(
            &global,
            stage.as_deref(),
            region.as_deref(),
            skip_hooks,
            cancel,
        ),
        Commands::Destroy { stage, region } => {
            cmd_destroy(&global, stage.as_deref(), region.as_deref(), cancel)
        }
        Commands::Plan { stage, region } => {
            cmd_plan(&global, stage.as_deref(), region.as_deref(), cancel)
        }
    }
}
