//! Deploy Use Case
//!
//! Orchestrates one deploy of one stage:
//! 1. Load the project descriptor and the local stage record
//! 2. Create the stack if it does not exist yet
//! 3. Resolve the deployment bucket through its export
//! 4. Decide what to redeploy and upload those artifacts
//! 5. Render and upload the update template, update the stack
//! 6. Commit the record and publish the marker
//! 7. Resolve exports, upload auxiliary files, run post-deploy hooks
//!
//! Steps 1-6 are fatal on error. Step 7 degrades: a missing export or a
//! failing hook becomes a warning on the result.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DeploySettings;
use crate::domain::entities::ProjectDescriptor;
use crate::domain::ports::{
    Clock, CreateOutcome, DeployEvent, DeployEventSink, FunctionHasher, HookError, NoopEventSink,
    ProjectRepository, RecordRepository, SystemClock, UpdateOutcome,
};
use crate::domain::services::{RedeployPlan, Substitutions};
use crate::domain::value_objects::{CancellationFlag, StackName, Stage};
use crate::error::{LiftoffError, LiftoffResult};

use super::super::artifact_store::{ArtifactStore, PendingUpload};
use super::super::backend::CloudBackend;
use super::super::stack_lifecycle::{ExportLookup, StackLifecycle};
use super::super::state_tracker::DeploymentStateTracker;
use super::options::DeployOptions;
use super::result::{DeployResult, ResolvedExport, UploadedFile};

/// Deploy use case - parameterized by its local ports, backed by a cloud
pub struct DeployUseCase<PR, RR, FH>
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
    cancel: CancellationFlag,
}

impl<PR, RR, FH> DeployUseCase<PR, RR, FH>
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

    /// Execute without progress events
    pub fn execute(&self, options: &DeployOptions) -> LiftoffResult<DeployResult> {
        self.execute_with_events(options, &NoopEventSink)
    }

    /// Execute, reporting progress to `events`
    pub fn execute_with_events(
        &self,
        options: &DeployOptions,
        events: &dyn DeployEventSink,
    ) -> LiftoffResult<DeployResult> {
        let stage = &options.stage;
        let project = self.projects.load()?;
        let stack = StackName::for_stage(&project.project_name, stage);
        events.on_event(DeployEvent::Started {
            command: "deploy",
            stack: stack.to_string(),
            stage: stage.to_string(),
        });
        info!(stack = %stack, %stage, "deploying");

        let lifecycle = self.lifecycle();
        let artifacts = ArtifactStore::new(
            self.backend.objects.as_ref(),
            self.settings.upload_concurrency,
        );
        let tracker = DeploymentStateTracker::new(&self.records);

        let mut result = DeployResult::new(stack.as_str(), stage.clone());
        let loaded = tracker.load(stage);
        if let Some(problem) = &loaded.problem {
            result
                .warnings
                .push(format!("local deployment record ignored: {}", problem));
        }

        result.created = self.ensure_stack(&lifecycle, &stack, stage, events)?;

        let bucket = self.resolve_bucket(&lifecycle, &stack)?;
        events.on_event(DeployEvent::BucketResolved {
            bucket: bucket.clone(),
        });
        result.bucket = bucket.clone();

        let marker = artifacts.read_marker(&bucket)?;
        let plan = tracker.decide(
            &self.hasher,
            &project,
            stage,
            &loaded.record,
            marker.as_deref(),
        );
        events.on_event(DeployEvent::PlanComputed {
            incremental: plan.mode.is_incremental(),
            to_deploy: plan.to_deploy.len(),
            total: plan.total(),
        });
        for warning in &plan.hash_warnings {
            result.warnings.push(format!(
                "could not hash {}, redeploying it: {}",
                warning.entry_point, warning.message
            ));
        }
        for entry_point in &plan.reissued {
            warn!(
                function = %entry_point,
                timestamp = %project.compilation_timestamp,
                "compiled output changed but the compilation timestamp did not"
            );
            result.warnings.push(format!(
                "{} changed without a new compilation timestamp; its version key is reused",
                entry_point
            ));
        }
        result.mode = plan.mode.clone();
        result.deployed = plan
            .to_deploy
            .iter()
            .map(|f| f.entry_point.clone())
            .collect();
        result.reused = plan.reused.clone();

        self.check_cancelled()?;
        result.uploaded = self.upload_artifacts(&artifacts, &bucket, &plan, events)?;

        self.check_cancelled()?;
        let template = self.projects.update_template(stage)?;
        result.template_url =
            artifacts.upload_template(&bucket, plan.tokens.render(&template).as_bytes())?;
        events.on_event(DeployEvent::TemplateUploaded {
            url: result.template_url.clone(),
        });

        result.stack_updated =
            self.update_stack(&lifecycle, &stack, &result.template_url, events)?;

        tracker.commit(stage, &plan.record, &artifacts, &bucket)?;
        events.on_event(DeployEvent::RecordCommitted {
            timestamp: project.compilation_timestamp.clone(),
        });

        let mut substitutions = plan.tokens.clone();
        self.resolve_exports(
            &lifecycle,
            &project,
            stage,
            &mut substitutions,
            &mut result,
            events,
        )?;
        self.upload_files(
            &artifacts,
            &project,
            stage,
            &substitutions,
            &mut result,
            events,
        )?;

        if options.skip_hooks {
            info!("skipping post-deploy hooks");
        } else {
            self.run_hooks(project.hooks_for(stage), &mut result, events);
        }

        events.on_event(DeployEvent::Completed {
            command: "deploy",
            uploaded: result.uploaded.len(),
            reused: result.reused.len(),
            warnings: result.warnings.len() + result.hook_failures.len(),
        });
        Ok(result)
    }

    fn lifecycle(&self) -> StackLifecycle<'_> {
        StackLifecycle::new(
            self.backend.stacks.as_ref(),
            self.clock.as_ref(),
            self.settings.poll,
            self.settings.exports,
            self.cancel.clone(),
        )
    }

    fn check_cancelled(&self) -> LiftoffResult<()> {
        if self.cancel.is_cancelled() {
            return Err(LiftoffError::Cancelled);
        }
        Ok(())
    }

    /// Returns true when the stack was created by this run
    fn ensure_stack(
        &self,
        lifecycle: &StackLifecycle<'_>,
        stack: &StackName,
        stage: &Stage,
        events: &dyn DeployEventSink,
    ) -> LiftoffResult<bool> {
        let body = self.projects.create_template(stage)?;
        match lifecycle.create_stack(stack.as_str(), &body)? {
            CreateOutcome::Created => {
                events.on_event(DeployEvent::StackCreating {
                    stack: stack.to_string(),
                });
                let status = lifecycle.poll_until_terminal(stack.as_str())?;
                events.on_event(DeployEvent::StackReady {
                    stack: stack.to_string(),
                    status: status.to_string(),
                });
                Ok(true)
            }
            CreateOutcome::AlreadyExists => {
                events.on_event(DeployEvent::StackExists {
                    stack: stack.to_string(),
                });
                Ok(false)
            }
        }
    }

    fn resolve_bucket(
        &self,
        lifecycle: &StackLifecycle<'_>,
        stack: &StackName,
    ) -> LiftoffResult<String> {
        let export = stack.deployment_bucket_export();
        match lifecycle.find_export(&export)? {
            ExportLookup::Found(bucket) => Ok(bucket),
            ExportLookup::NotFound { .. } => Err(LiftoffError::BucketNotFound { export }),
        }
    }

    fn upload_artifacts(
        &self,
        artifacts: &ArtifactStore<'_>,
        bucket: &str,
        plan: &RedeployPlan,
        events: &dyn DeployEventSink,
    ) -> LiftoffResult<Vec<String>> {
        let sources: Vec<(PathBuf, &str)> = plan
            .uploads
            .iter()
            .map(|upload| (self.settings.build_dir.join(&upload.artifact), upload.key()))
            .collect();
        let pending: Vec<PendingUpload<'_>> = sources
            .iter()
            .map(|(path, key)| PendingUpload {
                path: path.as_path(),
                key,
            })
            .collect();

        let total = pending.len();
        artifacts.upload_all(bucket, &pending, |index, key| {
            events.on_event(DeployEvent::ArtifactUploaded {
                index,
                total,
                key: key.to_string(),
            });
        })?;

        Ok(sources.into_iter().map(|(_, key)| key.to_string()).collect())
    }

    /// Returns false when the provider had nothing to update
    fn update_stack(
        &self,
        lifecycle: &StackLifecycle<'_>,
        stack: &StackName,
        template_url: &str,
        events: &dyn DeployEventSink,
    ) -> LiftoffResult<bool> {
        match lifecycle.update_stack(stack.as_str(), template_url)? {
            UpdateOutcome::Updating => {
                events.on_event(DeployEvent::StackUpdating {
                    stack: stack.to_string(),
                });
                let status = lifecycle.poll_until_terminal(stack.as_str())?;
                events.on_event(DeployEvent::StackReady {
                    stack: stack.to_string(),
                    status: status.to_string(),
                });
                Ok(true)
            }
            UpdateOutcome::NoChanges => {
                events.on_event(DeployEvent::StackUnchanged {
                    stack: stack.to_string(),
                });
                Ok(false)
            }
        }
    }

    fn resolve_exports(
        &self,
        lifecycle: &StackLifecycle<'_>,
        project: &ProjectDescriptor,
        stage: &Stage,
        substitutions: &mut Substitutions,
        result: &mut DeployResult,
        events: &dyn DeployEventSink,
    ) -> LiftoffResult<()> {
        for watch in project.exports_for(stage) {
            match lifecycle.find_export(&watch.export_name)? {
                ExportLookup::Found(value) => {
                    substitutions.insert(watch.substitution_token.clone(), value.clone());
                    events.on_event(DeployEvent::ExportResolved {
                        name: watch.export_name.clone(),
                        value: value.clone(),
                    });
                    result.outputs.push(ResolvedExport {
                        name: watch.export_name.clone(),
                        message: watch.message.clone(),
                        value,
                    });
                }
                ExportLookup::NotFound { attempts } => {
                    warn!(export = %watch.export_name, attempts, "export not found");
                    events.on_event(DeployEvent::ExportUnavailable {
                        name: watch.export_name.clone(),
                    });
                    result.warnings.push(format!(
                        "export {} not found after {} attempt(s); {} left unresolved",
                        watch.export_name, attempts, watch.substitution_token
                    ));
                }
            }
        }
        Ok(())
    }

    fn upload_files(
        &self,
        artifacts: &ArtifactStore<'_>,
        project: &ProjectDescriptor,
        stage: &Stage,
        substitutions: &Substitutions,
        result: &mut DeployResult,
        events: &dyn DeployEventSink,
    ) -> LiftoffResult<()> {
        for task in project.file_uploads_for(stage) {
            self.check_cancelled()?;
            let source = if task.source.is_absolute() {
                task.source.clone()
            } else {
                self.settings.project_root.join(&task.source)
            };
            let keys = artifacts.upload_path(
                &task.bucket,
                &source,
                &task.target,
                task.substitute.then_some(substitutions),
            )?;
            for key in keys {
                events.on_event(DeployEvent::FileUploaded {
                    bucket: task.bucket.clone(),
                    key: key.clone(),
                });
                result.files.push(UploadedFile {
                    bucket: task.bucket.clone(),
                    key,
                });
            }
        }
        Ok(())
    }

    /// Invoke every hook concurrently and wait for all of them
    fn run_hooks(
        &self,
        hooks: &[String],
        result: &mut DeployResult,
        events: &dyn DeployEventSink,
    ) {
        if hooks.is_empty() {
            return;
        }
        let invoker = self.backend.hooks.as_ref();

        let outcomes: Vec<Result<(), HookError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = hooks
                .iter()
                .map(|name| scope.spawn(move || invoker.invoke(name)))
                .collect();
            handles
                .into_iter()
                .zip(hooks)
                .map(|(handle, name)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(HookError::Invoke {
                            name: name.clone(),
                            message: "hook invocation panicked".to_string(),
                        })
                    })
                })
                .collect()
        });

        for (name, outcome) in hooks.iter().zip(outcomes) {
            match outcome {
                Ok(()) => {
                    info!(hook = %name, "post-deploy hook succeeded");
                    events.on_event(DeployEvent::HookSucceeded { name: name.clone() });
                    result.hooks_succeeded.push(name.clone());
                }
                Err(err) => {
                    warn!(hook = %name, "post-deploy hook failed: {}", err);
                    events.on_event(DeployEvent::HookFailed {
                        name: name.clone(),
                        error: err.to_string(),
                    });
                    result.hook_failures.push(err);
                }
            }
        }
    }
}
