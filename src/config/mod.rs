//! Configuration module for Liftoff
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (LIFTOFF_*)
//! 3. Project config (`liftoff.toml`)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use crate::domain::value_objects::ConfigWarning;

pub use loader::CONFIG_FILE;
pub use types::{
    Config, DeployConfig, DeploySettings, ExportsConfig, PollingConfig, ProviderConfig,
    ProviderKind,
};
