//! Deploy Options

use crate::domain::value_objects::Stage;

/// Options for the deploy use case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Stage to deploy
    pub stage: Stage,
    /// Skip the post-deploy hooks for this run
    pub skip_hooks: bool,
}

impl DeployOptions {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            skip_hooks: false,
        }
    }

    pub fn with_skip_hooks(mut self, skip: bool) -> Self {
        self.skip_hooks = skip;
        self
    }
}
