//! ProjectRepository port - read access to what the build step produced

use crate::domain::entities::ProjectDescriptor;
use crate::domain::value_objects::Stage;
use crate::error::LiftoffResult;

pub trait ProjectRepository: Send + Sync {
    /// Load and validate the project descriptor
    fn load(&self) -> LiftoffResult<ProjectDescriptor>;

    /// Template used to create the stack for `stage` (passed inline)
    fn create_template(&self, stage: &Stage) -> LiftoffResult<String>;

    /// Template text to render and upload for every stage update
    fn update_template(&self, stage: &Stage) -> LiftoffResult<String>;
}
