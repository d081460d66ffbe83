//! Redeploy planning service
//!
//! Decides which functions of a stage must be uploaded again. Local history
//! is only trusted when the remote marker says the last deploy of this stage
//! was the one recorded locally; otherwise every active function is
//! redeployed regardless of its hash.

use crate::domain::entities::{
    DeployedFunctionVersion, FunctionDescriptor, ProjectDescriptor, StageDeploymentRecord,
};
use crate::domain::ports::FunctionHasher;
use crate::domain::value_objects::{ContentHash, FunctionVersion, Stage};

use super::substitution::Substitutions;

/// Why local history was not used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullRedeployReason {
    /// No local record for this stage
    FirstDeployment,
    /// Remote marker and local record disagree (other machine, partial deploy)
    MarkerMismatch {
        local: String,
        remote: Option<String>,
    },
    /// Project ships one shared artifact for every function
    SharedArtifact,
}

/// How the redeploy set was computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeployMode {
    Incremental,
    Full(FullRedeployReason),
}

impl RedeployMode {
    pub fn is_incremental(&self) -> bool {
        matches!(self, RedeployMode::Incremental)
    }
}

/// One artifact to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUpload {
    /// Artifact file name relative to the build directory
    pub artifact: String,
    pub version: FunctionVersion,
}

impl ArtifactUpload {
    pub fn key(&self) -> &str {
        self.version.object_key()
    }
}

/// A function whose hash could not be computed; it is redeployed regardless
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashWarning {
    pub entry_point: String,
    pub message: String,
}

/// Output of the redeploy decision
#[derive(Debug, Clone)]
pub struct RedeployPlan {
    pub mode: RedeployMode,
    /// Functions that get a fresh version this run
    pub to_deploy: Vec<FunctionDescriptor>,
    /// Entry points whose previous version is carried forward
    pub reused: Vec<String>,
    /// Distinct uploads needed for `to_deploy`
    pub uploads: Vec<ArtifactUpload>,
    /// Record to commit once the stack update succeeds
    pub record: StageDeploymentRecord,
    /// One binding per active function
    pub tokens: Substitutions,
    pub hash_warnings: Vec<HashWarning>,
    /// Redeployed functions whose fresh version equals the recorded one.
    ///
    /// Their upload overwrites the object the live stack already points at,
    /// and the rendered template does not change.
    pub reissued: Vec<String>,
}

impl RedeployPlan {
    /// Number of functions active in the stage
    pub fn total(&self) -> usize {
        self.to_deploy.len() + self.reused.len()
    }
}

/// Computes `RedeployPlan`s
pub struct RedeployPlanner<'a> {
    hasher: &'a dyn FunctionHasher,
}

impl<'a> RedeployPlanner<'a> {
    pub fn new(hasher: &'a dyn FunctionHasher) -> Self {
        Self { hasher }
    }

    /// Decide what to deploy for `stage`.
    ///
    /// `marker` is the compilation timestamp published remotely by the last
    /// committed deploy, if any.
    pub fn plan(
        &self,
        project: &ProjectDescriptor,
        stage: &Stage,
        previous: &StageDeploymentRecord,
        marker: Option<&str>,
    ) -> RedeployPlan {
        let mode = if !project.assemble {
            RedeployMode::Full(FullRedeployReason::SharedArtifact)
        } else {
            match previous.last_compilation_timestamp() {
                None => RedeployMode::Full(FullRedeployReason::FirstDeployment),
                Some(_) if previous.is_trusted_by(marker) => RedeployMode::Incremental,
                Some(local) => RedeployMode::Full(FullRedeployReason::MarkerMismatch {
                    local: local.to_string(),
                    remote: marker.map(str::to_string),
                }),
            }
        };

        let timestamp = project.compilation_timestamp.as_str();
        let mut plan = RedeployPlan {
            mode,
            to_deploy: Vec::new(),
            reused: Vec::new(),
            uploads: Vec::new(),
            record: StageDeploymentRecord::for_compilation(timestamp),
            tokens: Substitutions::new(),
            hash_warnings: Vec::new(),
            reissued: Vec::new(),
        };

        let shared_version = project
            .shared_artifact
            .as_deref()
            .filter(|_| !project.assemble)
            .map(|artifact| (artifact, FunctionVersion::mint(timestamp, artifact)));

        for function in project.active_functions(stage) {
            let hash = self.hash_function(function, &mut plan.hash_warnings);

            let carried = previous
                .get(&function.entry_point)
                .filter(|_| plan.mode.is_incremental())
                .filter(|deployed| deployed.matches(hash.as_ref()));

            if let Some(deployed) = carried {
                plan.tokens
                    .insert(&function.version_token, deployed.version().as_str());
                plan.record.set(&function.entry_point, deployed.clone());
                plan.reused.push(function.entry_point.clone());
                continue;
            }

            let version = match &shared_version {
                Some((_, version)) => version.clone(),
                None => {
                    let version = FunctionVersion::mint(timestamp, &function.artifact);
                    plan.uploads.push(ArtifactUpload {
                        artifact: function.artifact.clone(),
                        version: version.clone(),
                    });
                    version
                }
            };
            if previous
                .get(&function.entry_point)
                .is_some_and(|deployed| deployed.version() == &version)
            {
                plan.reissued.push(function.entry_point.clone());
            }
            plan.tokens
                .insert(&function.version_token, version.as_str());
            plan.record.set(
                &function.entry_point,
                DeployedFunctionVersion::new(version, hash),
            );
            plan.to_deploy.push(function.clone());
        }

        if let Some((artifact, version)) = shared_version {
            if !plan.to_deploy.is_empty() {
                plan.uploads.push(ArtifactUpload {
                    artifact: artifact.to_string(),
                    version,
                });
            }
        }

        plan
    }

    fn hash_function(
        &self,
        function: &FunctionDescriptor,
        warnings: &mut Vec<HashWarning>,
    ) -> Option<ContentHash> {
        match self.hasher.hash(function) {
            Ok(hash) => Some(hash),
            Err(err) => {
                warnings.push(HashWarning {
                    entry_point: function.entry_point.clone(),
                    message: err.to_string(),
                });
                None
            }
        }
    }
}
