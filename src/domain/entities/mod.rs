//! Domain Entities
//!
//! - `ProjectDescriptor` - What the build step produced (functions, exports, uploads, hooks)
//! - `StageDeploymentRecord` - What was deployed last for one stage

mod deployment_record;
mod project;

pub use deployment_record::{DeployedFunctionVersion, StageDeploymentRecord};
pub use project::{ExportWatch, FileUploadTask, FunctionDescriptor, ProjectDescriptor};
