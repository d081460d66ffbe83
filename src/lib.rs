//! Liftoff - incremental deployment orchestrator for serverless projects
//!
//! Liftoff takes what a build step produced (function artifacts, a project
//! descriptor and stack templates) and brings one stage of the project up to
//! date: it creates or updates the stage's stack, uploads only the functions
//! whose compiled content changed, and runs post-deploy steps.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    CloudBackend, DeployOptions, DeployResult, DeployUseCase, DestroyOptions, DestroyResult,
    DestroyUseCase, PlanResult, PlanUseCase,
};
pub use config::{Config, DeploySettings};
pub use domain::value_objects::Stage;
pub use error::{LiftoffError, LiftoffResult};
