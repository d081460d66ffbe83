//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Create or update the stage stack and ship what changed
//! - `DestroyUseCase` - Empty the deployment bucket, delete the stack
//! - `PlanUseCase` - Read-only preview of the redeploy decision
//!
//! ## Services
//!
//! - `StackLifecycle` - Stack operations, status polling, export lookup
//! - `ArtifactStore` - Uploads, marker, templates, bucket teardown
//! - `DeploymentStateTracker` - Local record load, decision, commit

pub mod artifact_store;
mod backend;
pub mod deploy;
pub mod destroy;
pub mod plan;
pub mod stack_lifecycle;
pub mod state_tracker;

#[cfg(test)]
pub(crate) mod test_support;

pub use artifact_store::{ArtifactStore, PendingUpload, MARKER_KEY, TEMPLATE_KEY};
pub use backend::CloudBackend;
pub use deploy::{DeployOptions, DeployResult, DeployUseCase, ResolvedExport, UploadedFile};
pub use destroy::{DestroyOptions, DestroyResult, DestroyUseCase};
pub use plan::{PlanResult, PlanUseCase};
pub use stack_lifecycle::{ExportLookup, StackLifecycle};
pub use state_tracker::{DeploymentStateTracker, LoadedRecord};
