//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Argument parsing (clap)
//! - `factory` - Connects the backend and builds use cases (dependency injection)
//! - `output` - Result rendering
//!
//! ## Usage
//!
//! ```ignore
//! use liftoff::presentation::factory;
//!
//! let backend = factory::connect_backend(&config, &project_root)?;
//! let use_case = factory::create_deploy_use_case(&settings, backend);
//! let result = use_case.execute(&options)?;
//! ```

pub mod cli;
pub mod factory;
pub mod output;

pub use factory::{
    connect_backend, create_deploy_use_case, create_destroy_use_case, create_plan_use_case,
};
pub use output::{create_renderer, OutputFormat, ResultRenderer};
