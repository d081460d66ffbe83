//! Plan use case and its result

use std::sync::Arc;

use crate::config::DeploySettings;
use crate::domain::ports::{
    Clock, FunctionHasher, ProjectRepository, RecordRepository, SystemClock,
};
use crate::domain::services::RedeployMode;
use crate::domain::value_objects::{CancellationFlag, StackName, Stage};
use crate::error::LiftoffResult;

use super::super::artifact_store::ArtifactStore;
use super::super::backend::CloudBackend;
use super::super::stack_lifecycle::{ExportLookup, StackLifecycle};
use super::super::state_tracker::DeploymentStateTracker;

/// What a deploy of the stage would do right now
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub stack: String,
    pub stage: Stage,
    pub stack_exists: bool,
    pub bucket: Option<String>,
    pub marker: Option<String>,
    pub mode: RedeployMode,
    pub to_deploy: Vec<String>,
    pub reused: Vec<String>,
    /// Object keys deploy would upload
    pub uploads: Vec<String>,
    pub warnings: Vec<String>,
}

pub struct PlanUseCase<PR, RR, FH>
where
    PR: ProjectRepository,
    RR: RecordRepository,
    FH: FunctionHasher,
{
    projects: PR,
    records: RR,
    hasher: FH,
    backend: CloudBackend,
    settings: DeploySettings,
    clock: Arc<dyn Clock>,
}

impl<PR, RR, FH> PlanUseCase<PR, RR, FH>
where
    PR: ProjectRepository,
    RR: RecordRepository,
    FH: FunctionHasher,
{
    pub fn new(
        projects: PR,
        records: RR,
        hasher: FH,
        backend: CloudBackend,
        settings: DeploySettings,
    ) -> Self {
        Self {
            projects,
            records,
            hasher,
            backend,
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn execute(&self, stage: &Stage) -> LiftoffResult<PlanResult> {
        let project = self.projects.load()?;
        let stack = StackName::for_stage(&project.project_name, stage);
        let lifecycle = StackLifecycle::new(
            self.backend.stacks.as_ref(),
            self.clock.as_ref(),
            self.settings.poll,
            self.settings.exports,
            CancellationFlag::new(),
        );
        let artifacts = ArtifactStore::new(self.backend.objects.as_ref(), 1);
        let tracker = DeploymentStateTracker::new(&self.records);
        let mut warnings = Vec::new();

        let stack_exists = !lifecycle.status(stack.as_str())?.is_gone();
        let bucket = if stack_exists {
            match lifecycle.find_export(&stack.deployment_bucket_export())? {
                ExportLookup::Found(bucket) => Some(bucket),
                ExportLookup::NotFound { .. } => {
                    warnings.push("deployment bucket export not found".to_string());
                    None
                }
            }
        } else {
            None
        };
        let marker = match &bucket {
            Some(bucket) => artifacts.read_marker(bucket)?,
            None => None,
        };

        let loaded = tracker.load(stage);
        if let Some(problem) = &loaded.problem {
            warnings.push(format!("local deployment record ignored: {}", problem));
        }
        let plan = tracker.decide(
            &self.hasher,
            &project,
            stage,
            &loaded.record,
            marker.as_deref(),
        );
        warnings.extend(
            plan.hash_warnings
                .iter()
                .map(|w| format!("could not hash {}: {}", w.entry_point, w.message)),
        );
        warnings.extend(plan.reissued.iter().map(|entry_point| {
            format!(
                "{} changed without a new compilation timestamp; its version key is reused",
                entry_point
            )
        }));

        Ok(PlanResult {
            stack: stack.to_string(),
            stage: stage.clone(),
            stack_exists,
            bucket,
            marker,
            mode: plan.mode,
            to_deploy: plan
                .to_deploy
                .iter()
                .map(|f| f.entry_point.clone())
                .collect(),
            reused: plan.reused,
            uploads: plan.uploads.iter().map(|u| u.key().to_string()).collect(),
            warnings,
        })
    }
}
