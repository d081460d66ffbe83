//! Shared setup for every command: configuration, settings, stage and backend.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use liftoff::application::CloudBackend;
use liftoff::config::{Config, DeploySettings};
use liftoff::domain::ports::DeployEventSink;
use liftoff::domain::value_objects::{CancellationFlag, Stage};
use liftoff::infrastructure::{JsonEventSink, LogEventSink, StateLock};
use liftoff::presentation::{connect_backend, create_renderer, OutputFormat, ResultRenderer};

/// Global flags shared by all subcommands
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub json: bool,
    pub verbose: u8,
    pub project_dir: PathBuf,
    pub config: Option<PathBuf>,
}

/// Everything a command needs once flags, environment and `liftoff.toml`
/// have been merged.
pub struct RunContext {
    pub config: Config,
    pub settings: DeploySettings,
    pub stage: Stage,
    pub json: bool,
    pub verbose: u8,
    pub cancel: CancellationFlag,
}

impl RunContext {
    pub fn load(
        global: &GlobalArgs,
        stage: Option<&str>,
        region: Option<&str>,
        cancel: CancellationFlag,
    ) -> Result<Self> {
        let root = resolve_root(&global.project_dir)?;

        let (config, warnings) = match &global.config {
            Some(path) => Config::load_with_warnings(&root.join(path))?,
            None => Config::load_or_default(&root)?,
        };
        for warning in &warnings {
            warn!("{}", warning);
        }

        let mut config = config.with_env_overrides();
        if let Some(region) = region {
            config.deploy.region = Some(region.to_string());
        }

        let settings = config.settings(&root)?;
        let stage = match stage {
            Some(name) => Stage::new(name)?,
            None => settings.default_stage.clone(),
        };
        debug!(root = %root.display(), stage = %stage, "run context ready");

        Ok(Self {
            config,
            settings,
            stage,
            json: global.json,
            verbose: global.verbose,
            cancel,
        })
    }

    /// Refuse to run alongside another deploy or destroy of the same project
    pub fn lock(&self) -> Result<StateLock> {
        Ok(StateLock::acquire(&self.settings.state_dir)?)
    }

    pub fn backend(&self) -> Result<CloudBackend> {
        Ok(connect_backend(&self.config, &self.settings.project_root)?)
    }

    pub fn event_sink(&self) -> Box<dyn DeployEventSink> {
        if self.json {
            Box::new(JsonEventSink::stdout())
        } else {
            Box::new(LogEventSink)
        }
    }

    pub fn renderer(&self) -> Box<dyn ResultRenderer> {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        create_renderer(format, supports_unicode(), self.verbose)
    }
}

fn resolve_root(project_dir: &Path) -> Result<PathBuf> {
    project_dir
        .canonicalize()
        .with_context(|| format!("project directory {} not found", project_dir.display()))
}

fn supports_unicode() -> bool {
    std::env::var("TERM").map(|term| term != "dumb").unwrap_or(true)
}
