//! Project descriptor entity
//!
//! Written by the build step, read once per run. Everything here is immutable
//! for the duration of a deploy.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Stage;

/// One deployable function/handler
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Unique class/entry-point path (primary key)
    pub entry_point: String,
    /// Artifact file name as produced by the build, relative to the build dir
    pub artifact: String,
    /// Stages in which this function is deployed
    #[serde(default)]
    pub stages: BTreeSet<String>,
    /// Template token replaced by this function's version
    pub version_token: String,
    /// Extra compiled files (relative to the build dir) that belong to this function
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compiled_files: Vec<PathBuf>,
}

impl FunctionDescriptor {
    pub fn is_active_in(&self, stage: &Stage) -> bool {
        self.stages.contains(stage.as_str())
    }
}

/// A stack export to resolve after the stack update completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportWatch {
    pub export_name: String,
    pub substitution_token: String,
    /// Prefix printed before the resolved value (`"REST API url: "`)
    #[serde(default)]
    pub message: String,
}

/// An auxiliary file (or directory) pushed to a bucket after deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadTask {
    pub bucket: String,
    pub source: PathBuf,
    pub target: String,
    /// Run the substitution engine over the file before upload
    #[serde(default)]
    pub substitute: bool,
}

fn default_true() -> bool {
    true
}

/// Everything the build step tells the orchestrator about the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub project_name: String,
    /// Opaque build identifier, distinct for every compilation
    pub compilation_timestamp: String,
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,
    #[serde(default)]
    pub exports: BTreeMap<String, Vec<ExportWatch>>,
    #[serde(default)]
    pub file_uploads: BTreeMap<String, Vec<FileUploadTask>>,
    /// Functions to invoke once the stage is deployed
    #[serde(default)]
    pub after_deploy: BTreeMap<String, Vec<String>>,
    /// When false, every function ships inside `shared_artifact`
    #[serde(default = "default_true")]
    pub assemble: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_artifact: Option<String>,
}

impl ProjectDescriptor {
    /// Check the invariants the build step is expected to uphold.
    pub fn validate(&self) -> Result<(), String> {
        if self.project_name.trim().is_empty() {
            return Err("project_name is empty".to_string());
        }
        if self.compilation_timestamp.trim().is_empty() {
            return Err("compilation_timestamp is empty".to_string());
        }
        let mut seen = HashSet::new();
        for function in &self.functions {
            if !seen.insert(function.entry_point.as_str()) {
                return Err(format!(
                    "duplicate entry point '{}'",
                    function.entry_point
                ));
            }
        }
        if !self.assemble && self.shared_artifact.is_none() {
            return Err("assemble is false but no shared_artifact is set".to_string());
        }
        Ok(())
    }

    pub fn active_functions<'a>(
        &'a self,
        stage: &'a Stage,
    ) -> impl Iterator<Item = &'a FunctionDescriptor> + 'a {
        self.functions.iter().filter(move |f| f.is_active_in(stage))
    }

    pub fn exports_for(&self, stage: &Stage) -> &[ExportWatch] {
        self.exports
            .get(stage.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn file_uploads_for(&self, stage: &Stage) -> &[FileUploadTask] {
        self.file_uploads
            .get(stage.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn hooks_for(&self, stage: &Stage) -> &[String] {
        self.after_deploy
            .get(stage.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
