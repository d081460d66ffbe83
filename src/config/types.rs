//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{PollPolicy, RetryPolicy, Stage};
use crate::error::LiftoffResult;

use super::loader::{self, ConfigWarning};

/// Deploy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Cloud region (aws provider only)
    #[serde(default)]
    pub region: Option<String>,

    /// Stage used when `--stage` is not given
    #[serde(default = "default_stage")]
    pub stage: String,

    /// Where the build step leaves artifacts and compiled files
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Where the build step leaves `project.json` and stack templates
    #[serde(default = "default_descriptor_dir")]
    pub descriptor_dir: PathBuf,

    /// Local deployment records and the run lock
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            region: None,
            stage: default_stage(),
            build_dir: default_build_dir(),
            descriptor_dir: default_descriptor_dir(),
            state_dir: default_state_dir(),
            upload_concurrency: default_upload_concurrency(),
        }
    }
}

fn default_stage() -> String {
    "dev".to_string()
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_descriptor_dir() -> PathBuf {
    PathBuf::from("build/liftoff")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".liftoff")
}

fn default_upload_concurrency() -> usize {
    4
}

/// Stack status polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            timeout_secs: default_poll_timeout(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_poll_timeout() -> u64 {
    3600
}

/// Export lookup retry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportsConfig {
    #[serde(default = "default_export_attempts")]
    pub attempts: u32,

    #[serde(default = "default_export_interval")]
    pub interval_secs: u64,
}

impl Default for ExportsConfig {
    fn default() -> Self {
        Self {
            attempts: default_export_attempts(),
            interval_secs: default_export_interval(),
        }
    }
}

fn default_export_attempts() -> u32 {
    15
}

fn default_export_interval() -> u64 {
    3
}

/// Which cloud backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Directory-backed emulation
    #[default]
    Local,
    /// CloudFormation, S3 and Lambda (requires the `aws` feature)
    Aws,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ProviderKind::Local),
            "aws" => Ok(ProviderKind::Aws),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    /// Root directory of the local cloud
    #[serde(default = "default_local_root")]
    pub root: PathBuf,

    /// Endpoint override for the aws provider (localstack and friends)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            root: default_local_root(),
            endpoint: None,
        }
    }
}

fn default_local_root() -> PathBuf {
    PathBuf::from(".liftoff/cloud")
}

/// Main configuration structure (`liftoff.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub exports: ExportsConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> LiftoffResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> LiftoffResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load `liftoff.toml` from the project root, or defaults
    pub fn load_or_default(project_root: &Path) -> LiftoffResult<(Self, Vec<ConfigWarning>)> {
        loader::load_or_default(project_root)
    }

    /// Apply environment variable overrides (LIFTOFF_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }

    /// Freeze into the settings the use cases run with.
    ///
    /// Relative directories are resolved against `project_root`.
    pub fn settings(&self, project_root: &Path) -> LiftoffResult<DeploySettings> {
        Ok(DeploySettings {
            project_root: project_root.to_path_buf(),
            default_stage: Stage::new(self.deploy.stage.clone())?,
            build_dir: project_root.join(&self.deploy.build_dir),
            descriptor_dir: project_root.join(&self.deploy.descriptor_dir),
            state_dir: project_root.join(&self.deploy.state_dir),
            upload_concurrency: self.deploy.upload_concurrency.max(1),
            poll: PollPolicy {
                interval: Duration::from_secs(self.polling.interval_secs),
                timeout: Duration::from_secs(self.polling.timeout_secs),
            },
            exports: RetryPolicy::new(
                self.exports.attempts,
                Duration::from_secs(self.exports.interval_secs),
            ),
        })
    }
}

/// Immutable settings threaded through the use cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySettings {
    pub project_root: PathBuf,
    pub default_stage: Stage,
    pub build_dir: PathBuf,
    pub descriptor_dir: PathBuf,
    pub state_dir: PathBuf,
    pub upload_concurrency: usize,
    pub poll: PollPolicy,
    pub exports: RetryPolicy,
}

impl DeploySettings {
    /// Defaults rooted at `project_root`
    pub fn for_project(project_root: &Path) -> LiftoffResult<Self> {
        Config::default().settings(project_root)
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_exports(mut self, exports: RetryPolicy) -> Self {
        self.exports = exports;
        self
    }
}
