//! Deployment state tracker
//!
//! Loads the local stage record, asks the planner what to redeploy, and
//! commits the new record once the stack update has succeeded.

use tracing::{info, warn};

use crate::domain::entities::{ProjectDescriptor, StageDeploymentRecord};
use crate::domain::ports::{FunctionHasher, RecordError, RecordRepository};
use crate::domain::services::{RedeployPlan, RedeployPlanner};
use crate::domain::value_objects::Stage;
use crate::error::LiftoffResult;

use super::artifact_store::ArtifactStore;

/// Local record plus the reason it had to be discarded, if any
#[derive(Debug)]
pub struct LoadedRecord {
    pub record: StageDeploymentRecord,
    pub problem: Option<RecordError>,
}

pub struct DeploymentStateTracker<'a> {
    records: &'a dyn RecordRepository,
}

impl<'a> DeploymentStateTracker<'a> {
    pub fn new(records: &'a dyn RecordRepository) -> Self {
        Self { records }
    }

    /// Load the stage record.
    ///
    /// An unreadable record degrades to an empty one, which forces a full
    /// redeploy instead of failing the run.
    pub fn load(&self, stage: &Stage) -> LoadedRecord {
        match self.records.load(stage) {
            Ok(record) => LoadedRecord {
                record,
                problem: None,
            },
            Err(err) => {
                warn!(%stage, "ignoring deployment record: {}", err);
                LoadedRecord {
                    record: StageDeploymentRecord::new(),
                    problem: Some(err),
                }
            }
        }
    }

    pub fn decide(
        &self,
        hasher: &dyn FunctionHasher,
        project: &ProjectDescriptor,
        stage: &Stage,
        previous: &StageDeploymentRecord,
        marker: Option<&str>,
    ) -> RedeployPlan {
        let plan = RedeployPlanner::new(hasher).plan(project, stage, previous, marker);
        info!(
            %stage,
            incremental = plan.mode.is_incremental(),
            to_deploy = plan.to_deploy.len(),
            total = plan.total(),
            "computed redeploy set"
        );
        plan
    }

    /// Save the record locally, then publish its timestamp as the marker.
    ///
    /// If publishing fails the local record no longer matches the marker,
    /// so the next run falls back to a full redeploy.
    pub fn commit(
        &self,
        stage: &Stage,
        record: &StageDeploymentRecord,
        artifacts: &ArtifactStore<'_>,
        bucket: &str,
    ) -> LiftoffResult<()> {
        self.records.save(stage, record)?;
        if let Some(timestamp) = record.last_compilation_timestamp() {
            artifacts.publish_marker(bucket, timestamp)?;
        }
        Ok(())
    }

    pub fn forget(&self, stage: &Stage) -> LiftoffResult<()> {
        Ok(self.records.delete(stage)?)
    }
}
