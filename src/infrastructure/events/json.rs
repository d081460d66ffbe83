//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.
//! Every line carries an RFC 3339 `ts` field.

use chrono::{SecondsFormat, Utc};

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, mut event: serde_json::Value) {
        if let Some(fields) = event.as_object_mut() {
            fields.insert(
                "ts".to_string(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true).into(),
            );
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::Started {
                command,
                stack,
                stage,
            } => serde_json::json!({
                "event": "start",
                "command": command,
                "stack": stack,
                "stage": stage,
            }),

            DeployEvent::StackCreating { stack } => serde_json::json!({
                "event": "stack_creating",
                "stack": stack,
            }),

            DeployEvent::StackExists { stack } => serde_json::json!({
                "event": "stack_exists",
                "stack": stack,
            }),

            DeployEvent::StackReady { stack, status } => serde_json::json!({
                "event": "stack_ready",
                "stack": stack,
                "status": status,
            }),

            DeployEvent::BucketResolved { bucket } => serde_json::json!({
                "event": "bucket_resolved",
                "bucket": bucket,
            }),

            DeployEvent::PlanComputed {
                incremental,
                to_deploy,
                total,
            } => serde_json::json!({
                "event": "plan",
                "mode": if incremental { "incremental" } else { "full" },
                "to_deploy": to_deploy,
                "total": total,
            }),

            DeployEvent::ArtifactUploaded { index, total, key } => serde_json::json!({
                "event": "artifact_uploaded",
                "index": index,
                "total": total,
                "key": key,
            }),

            DeployEvent::TemplateUploaded { url } => serde_json::json!({
                "event": "template_uploaded",
                "url": url,
            }),

            DeployEvent::StackUpdating { stack } => serde_json::json!({
                "event": "stack_updating",
                "stack": stack,
            }),

            DeployEvent::StackUnchanged { stack } => serde_json::json!({
                "event": "stack_unchanged",
                "stack": stack,
            }),

            DeployEvent::RecordCommitted { timestamp } => serde_json::json!({
                "event": "record_committed",
                "timestamp": timestamp,
            }),

            DeployEvent::ExportResolved { name, value } => serde_json::json!({
                "event": "export_resolved",
                "name": name,
                "value": value,
            }),

            DeployEvent::ExportUnavailable { name } => serde_json::json!({
                "event": "export_unavailable",
                "name": name,
            }),

            DeployEvent::FileUploaded { bucket, key } => serde_json::json!({
                "event": "file_uploaded",
                "bucket": bucket,
                "key": key,
            }),

            DeployEvent::HookSucceeded { name } => serde_json::json!({
                "event": "hook_succeeded",
                "name": name,
            }),

            DeployEvent::HookFailed { name, error } => serde_json::json!({
                "event": "hook_failed",
                "name": name,
                "error": error,
            }),

            DeployEvent::BucketEmptied { bucket, removed } => serde_json::json!({
                "event": "bucket_emptied",
                "bucket": bucket,
                "removed": removed,
            }),

            DeployEvent::StackDeleted { stack } => serde_json::json!({
                "event": "stack_deleted",
                "stack": stack,
            }),

            DeployEvent::Completed {
                command,
                uploaded,
                reused,
                warnings,
            } => serde_json::json!({
                "event": "complete",
                "command": command,
                "status": if warnings == 0 { "success" } else { "partial" },
                "uploaded": uploaded,
                "reused": reused,
                "warnings": warnings,
            }),
        };

        self.write_event(json);
    }
}
