//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod redeploy_planner;
mod substitution;

pub use redeploy_planner::{
    ArtifactUpload, FullRedeployReason, HashWarning, RedeployMode, RedeployPlan, RedeployPlanner,
};
pub use substitution::Substitutions;
