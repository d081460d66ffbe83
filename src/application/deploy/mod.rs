//! Deploy Module
//!
//! Brings one stage of a project up to date: ensures the stack exists,
//! uploads what changed, updates the stack, then runs the post-deploy steps.
//!
//! ## Structure
//!
//! - `options` - `DeployOptions`
//! - `result` - `DeployResult`, `ResolvedExport`, `UploadedFile`
//! - `use_case` - `DeployUseCase`
//!
//! ## Usage
//!
//! ```ignore
//! use liftoff::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(projects, records, hasher, backend, settings);
//! let result = use_case.execute(&DeployOptions::new(stage))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::DeployOptions;
pub use result::{DeployResult, ResolvedExport, UploadedFile};
pub use use_case::DeployUseCase;
