//! Command handlers
//!
//! Each handler merges configuration into a [`context::RunContext`], builds
//! the use case through the presentation factory and prints the rendered
//! result. Errors are returned as `anyhow::Error` for `main` to report.

pub mod context;
pub mod deploy;
pub mod destroy;
pub mod plan;

pub use context::GlobalArgs;
pub use deploy::cmd_deploy;
pub use destroy::cmd_destroy;
pub use plan::cmd_plan;
