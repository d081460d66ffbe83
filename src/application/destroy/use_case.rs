//! Destroy use case

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DeploySettings;
use crate::domain::ports::{
    Clock, DeployEvent, DeployEventSink, NoopEventSink, ProjectRepository, RecordRepository,
    SystemClock,
};
use crate::domain::value_objects::{CancellationFlag, StackName};
use crate::error::LiftoffResult;

use super::super::artifact_store::ArtifactStore;
use super::super::backend::CloudBackend;
use super::super::stack_lifecycle::{ExportLookup, StackLifecycle};
use super::super::state_tracker::DeploymentStateTracker;
use super::options::DestroyOptions;
use super::result::DestroyResult;

pub struct DestroyUseCase<PR, RR>
where
    PR: ProjectRepository,
    RR: RecordRepository,
{
    projects: PR,
    records: RR,
    backend: CloudBackend,
    settings: DeploySettings,
    clock: Arc<dyn Clock>,
    cancel: CancellationFlag,
}

impl<PR, RR> DestroyUseCase<PR, RR>
where
    PR: ProjectRepository,
    RR: RecordRepository,
{
    pub fn new(projects: PR, records: RR, backend: CloudBackend, settings: DeploySettings) -> Self {
        Self {
            projects,
            records,
            backend,
            settings,
            clock: Arc::new(SystemClock),
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn execute(&self, options: &DestroyOptions) -> LiftoffResult<DestroyResult> {
        self.execute_with_events(options, &NoopEventSink)
    }

    pub fn execute_with_events(
        &self,
        options: &DestroyOptions,
        events: &dyn DeployEventSink,
    ) -> LiftoffResult<DestroyResult> {
        let stage = &options.stage;
        let project = self.projects.load()?;
        let stack = StackName::for_stage(&project.project_name, stage);
        events.on_event(DeployEvent::Started {
            command: "destroy",
            stack: stack.to_string(),
            stage: stage.to_string(),
        });

        let lifecycle = StackLifecycle::new(
            self.backend.stacks.as_ref(),
            self.clock.as_ref(),
            self.settings.poll,
            self.settings.exports,
            self.cancel.clone(),
        );
        let artifacts = ArtifactStore::new(
            self.backend.objects.as_ref(),
            self.settings.upload_concurrency,
        );
        let tracker = DeploymentStateTracker::new(&self.records);
        let mut result = DestroyResult::new(stack.as_str(), stage.clone());

        let status = lifecycle.status(stack.as_str())?;
        if status.is_gone() {
            info!(stack = %stack, "stack does not exist, nothing to delete");
        } else {
            result.stack_existed = true;

            match lifecycle.find_export(&stack.deployment_bucket_export())? {
                ExportLookup::Found(bucket) => {
                    let removed = artifacts.delete_bucket_recursively(&bucket)?;
                    events.on_event(DeployEvent::BucketEmptied {
                        bucket: bucket.clone(),
                        removed,
                    });
                    result.removed_objects = removed;
                    result.bucket = Some(bucket);
                }
                ExportLookup::NotFound { attempts } => {
                    warn!(stack = %stack, attempts, "deployment bucket export not found");
                    result.add_warning(format!(
                        "deployment bucket export not found after {} attempt(s); \
                         deleting the stack anyway",
                        attempts
                    ));
                }
            }

            lifecycle.delete_stack(stack.as_str())?;
            lifecycle.poll_until_terminal(stack.as_str())?;
            events.on_event(DeployEvent::StackDeleted {
                stack: stack.to_string(),
            });
            info!(stack = %stack, "stack deleted");
        }

        tracker.forget(stage)?;
        events.on_event(DeployEvent::Completed {
            command: "destroy",
            uploaded: 0,
            reused: 0,
            warnings: result.warnings.len(),
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::deploy::DeployOptions;
    use crate::application::test_support::{Fixture, RecordingSink, BUCKET, STACK};
    use crate::domain::ports::StackProvider;
    use crate::domain::value_objects::{StackStatus, Stage};
    use crate::infrastructure::LocalStackProvider;

    fn stage() -> DestroyOptions {
        DestroyOptions::new(Stage::default())
    }

    fn stack_status(fixture: &Fixture) -> StackStatus {
        LocalStackProvider::new(fixture.cloud_root(), fixture.objects())
            .stack_status(STACK)
            .unwrap()
    }

    #[test]
    fn destroy_removes_bucket_stack_and_record() {
        let fixture = Fixture::new();
        fixture
            .deploy()
            .execute(&DeployOptions::new(Stage::default()))
            .unwrap();
        fixture.recompile("20240102T0000");
        fixture.write_build("com/shop/Orders.class", "orders-class-v2");
        fixture
            .deploy()
            .execute(&DeployOptions::new(Stage::default()))
            .unwrap();

        let result = fixture.destroy().execute(&stage()).unwrap();

        assert!(result.stack_existed);
        assert_eq!(result.bucket.as_deref(), Some(BUCKET));
        // two deploys left several versions of the marker and template
        assert!(result.removed_objects > 6);
        assert!(!fixture.objects().bucket_exists(BUCKET));
        assert_eq!(stack_status(&fixture), StackStatus::Absent);
        assert!(!fixture.records().path_for(&Stage::default()).exists());
    }

    #[test]
    fn destroy_without_stack_only_forgets_record() {
        let fixture = Fixture::new();
        let sink = RecordingSink::default();

        let result = fixture
            .destroy()
            .execute_with_events(&stage(), &sink)
            .unwrap();

        assert!(!result.stack_existed);
        assert!(result.bucket.is_none());
        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e, DeployEvent::StackDeleted { .. })));
    }

    #[test]
    fn destroy_without_bucket_export_still_deletes_stack() {
        let fixture = Fixture::new();
        fixture.write_descriptor_dir(
            "stack-create-dev.json",
            r#"{"Resources": {"DeploymentBucket": {"Type": "AWS::S3::Bucket"}}}"#,
        );
        // deploy stops at the missing export but leaves the stack behind
        assert!(fixture
            .deploy()
            .execute(&DeployOptions::new(Stage::default()))
            .is_err());

        let result = fixture.destroy().execute(&stage()).unwrap();

        assert!(result.stack_existed);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(stack_status(&fixture), StackStatus::Absent);
    }

    #[test]
    fn redeploy_after_destroy_starts_from_scratch() {
        let fixture = Fixture::new();
        let deploy = DeployOptions::new(Stage::default());
        fixture.deploy().execute(&deploy).unwrap();
        fixture.destroy().execute(&stage()).unwrap();

        let result = fixture.deploy().execute(&deploy).unwrap();

        assert!(result.created);
        assert_eq!(result.uploaded.len(), 2);
    }
}
