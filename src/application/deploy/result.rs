//! Deploy Result
//!
//! What a deploy run did, for rendering and for tests.

use crate::domain::ports::HookError;
use crate::domain::services::RedeployMode;
use crate::domain::value_objects::Stage;

/// An export resolved after the stack update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExport {
    pub name: String,
    /// Prefix configured for display
    pub message: String,
    pub value: String,
}

/// One object written by a file upload task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub bucket: String,
    pub key: String,
}

/// Result of a deploy operation
#[derive(Debug, Clone)]
pub struct DeployResult {
    pub stack: String,
    pub stage: Stage,
    /// Stack did not exist before this run
    pub created: bool,
    pub bucket: String,
    pub mode: RedeployMode,
    /// Entry points that received a new version
    pub deployed: Vec<String>,
    /// Entry points whose previous version was carried forward
    pub reused: Vec<String>,
    /// Artifact object keys uploaded
    pub uploaded: Vec<String>,
    pub template_url: String,
    /// False when the provider reported nothing to update
    pub stack_updated: bool,
    pub outputs: Vec<ResolvedExport>,
    pub files: Vec<UploadedFile>,
    pub hooks_succeeded: Vec<String>,
    pub hook_failures: Vec<HookError>,
    pub warnings: Vec<String>,
}

impl DeployResult {
    pub fn new(stack: impl Into<String>, stage: Stage) -> Self {
        Self {
            stack: stack.into(),
            stage,
            created: false,
            bucket: String::new(),
            mode: RedeployMode::Incremental,
            deployed: Vec::new(),
            reused: Vec::new(),
            uploaded: Vec::new(),
            template_url: String::new(),
            stack_updated: false,
            outputs: Vec::new(),
            files: Vec::new(),
            hooks_succeeded: Vec::new(),
            hook_failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Hook failures do not fail the run; this only reports them
    pub fn is_clean(&self) -> bool {
        self.hook_failures.is_empty() && self.warnings.is_empty()
    }

    pub fn has_changes(&self) -> bool {
        self.created || self.stack_updated || !self.uploaded.is_empty()
    }
}
