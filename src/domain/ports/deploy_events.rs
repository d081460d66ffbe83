//! Deploy Event Port
//!
//! Provides an observable interface for deploy and destroy runs.
//! Enables progress logging, JSON event streams, and test assertions.

/// Event emitted during deploy/destroy operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// Run started
    Started {
        command: &'static str,
        stack: String,
        stage: String,
    },

    /// Stack did not exist and is being created
    StackCreating { stack: String },

    /// Stack already existed, proceeding to update
    StackExists { stack: String },

    /// Stack reached a successful terminal status
    StackReady { stack: String, status: String },

    /// Deployment bucket found through its export
    BucketResolved { bucket: String },

    /// Redeploy decision made
    PlanComputed {
        incremental: bool,
        to_deploy: usize,
        total: usize,
    },

    /// One artifact uploaded
    ArtifactUploaded {
        index: usize,
        total: usize,
        key: String,
    },

    /// Rendered template uploaded
    TemplateUploaded { url: String },

    /// Stack update requested
    StackUpdating { stack: String },

    /// Provider reported nothing to update
    StackUnchanged { stack: String },

    /// Local record written and remote marker published
    RecordCommitted { timestamp: String },

    /// Export value resolved
    ExportResolved { name: String, value: String },

    /// Export never became visible; run continues
    ExportUnavailable { name: String },

    /// Auxiliary file uploaded
    FileUploaded { bucket: String, key: String },

    /// Post-deploy hook succeeded
    HookSucceeded { name: String },

    /// Post-deploy hook failed (does not fail the run)
    HookFailed { name: String, error: String },

    /// Bucket emptied during destroy
    BucketEmptied { bucket: String, removed: usize },

    /// Stack deletion finished
    StackDeleted { stack: String },

    /// Run completed
    Completed {
        command: &'static str,
        uploaded: usize,
        reused: usize,
        warnings: usize,
    },
}

/// Trait for receiving deploy events
///
/// Implementations:
/// - `LogEventSink`: progress through `tracing`
/// - `JsonEventSink`: NDJSON event stream for CI
/// - `NoopEventSink`: silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Test event sink that records all events
    struct RecordingEventSink {
        events: Arc<Mutex<Vec<DeployEvent>>>,
    }

    impl RecordingEventSink {
        fn new() -> (Self, Arc<Mutex<Vec<DeployEvent>>>) {
            let events = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    events: events.clone(),
                },
                events,
            )
        }
    }

    impl DeployEventSink for RecordingEventSink {
        fn on_event(&self, event: DeployEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn recording_sink_captures_events() {
        let (sink, events) = RecordingEventSink::new();

        sink.on_event(DeployEvent::Started {
            command: "deploy",
            stack: "shop-dev".to_string(),
            stage: "dev".to_string(),
        });
        sink.on_event(DeployEvent::ArtifactUploaded {
            index: 1,
            total: 2,
            key: "t1/a.jar".to_string(),
        });

        let recorded = events.lock().unwrap();
        assert_eq!(recorded.len(), 2);
    }
}
