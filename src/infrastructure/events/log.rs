//! Log Event Sink
//!
//! Human-readable progress through `tracing`.

use tracing::{info, warn};

use crate::domain::ports::{DeployEvent, DeployEventSink};

/// Default sink: one log line per milestone
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl DeployEventSink for LogEventSink {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::Started {
                command,
                stack,
                stage,
            } => info!("{} {} (stage {})", command, stack, stage),
            DeployEvent::StackCreating { stack } => info!("creating stack {}", stack),
            DeployEvent::StackExists { stack } => info!("stack {} exists, updating", stack),
            DeployEvent::StackReady { stack, status } => info!("stack {} is {}", stack, status),
            DeployEvent::BucketResolved { bucket } => info!("deployment bucket: {}", bucket),
            DeployEvent::PlanComputed {
                incremental,
                to_deploy,
                total,
            } => {
                if incremental {
                    info!("incremental deploy: {} of {} functions changed", to_deploy, total)
                } else {
                    info!("full deploy: {} functions", to_deploy)
                }
            }
            DeployEvent::ArtifactUploaded { index, total, key } => {
                info!("[{}/{}] uploaded {}", index, total, key)
            }
            DeployEvent::TemplateUploaded { url } => info!("template uploaded to {}", url),
            DeployEvent::StackUpdating { stack } => info!("updating stack {}", stack),
            DeployEvent::StackUnchanged { stack } => info!("stack {} already up to date", stack),
            DeployEvent::RecordCommitted { timestamp } => {
                info!("recorded deployment of build {}", timestamp)
            }
            DeployEvent::ExportResolved { name, value } => info!("{} = {}", name, value),
            DeployEvent::ExportUnavailable { name } => warn!("export {} never appeared", name),
            DeployEvent::FileUploaded { bucket, key } => info!("uploaded s3://{}/{}", bucket, key),
            DeployEvent::HookSucceeded { name } => info!("hook {} succeeded", name),
            DeployEvent::HookFailed { name, error } => warn!("hook {} failed: {}", name, error),
            DeployEvent::BucketEmptied { bucket, removed } => {
                info!("emptied bucket {} ({} objects and versions)", bucket, removed)
            }
            DeployEvent::StackDeleted { stack } => info!("stack {} deleted", stack),
            DeployEvent::Completed {
                command,
                uploaded,
                reused,
                warnings,
            } => info!(
                "{} finished: {} uploaded, {} reused, {} warning(s)",
                command, uploaded, reused, warnings
            ),
        }
    }
}
