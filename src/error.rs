//! Error types for Liftoff
//!
//! Uses `thiserror` for library errors. Each port has its own error enum;
//! `LiftoffError` is what the use cases surface to the command layer.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::ports::{HashError, HookError, ProviderError, RecordError, StoreError};
use crate::domain::value_objects::StackStatus;

/// Result type alias for Liftoff operations
pub type LiftoffResult<T> = Result<T, LiftoffError>;

/// A single failed upload inside an aggregated upload batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub key: String,
    pub message: String,
}

/// Main error type for Liftoff operations
#[derive(Error, Debug)]
pub enum LiftoffError {
    /// Project descriptor missing (build step has not run)
    #[error("project descriptor not found at {path} - run the build step first")]
    DescriptorMissing { path: PathBuf },

    /// Project descriptor could not be parsed or violates an invariant
    #[error("invalid project descriptor {path}: {message}")]
    DescriptorInvalid { path: PathBuf, message: String },

    /// Stack template for a stage is missing
    #[error("stack template not found at {path}")]
    TemplateMissing { path: PathBuf },

    /// Provider rejected a stack operation
    #[error("unable to {operation} stack '{stack}': {source}")]
    StackRejected {
        operation: &'static str,
        stack: String,
        #[source]
        source: ProviderError,
    },

    /// Stack reached a failure terminal status
    #[error("stack '{stack}' ended in {status}")]
    StackFailed { stack: String, status: StackStatus },

    /// Stack never reached a terminal status within the poll budget
    #[error("stack '{stack}' did not reach a terminal status within {}s", .waited.as_secs())]
    PollTimeout { stack: String, waited: Duration },

    /// The run was cancelled by the operator
    #[error("operation cancelled")]
    Cancelled,

    /// Deployment bucket export never became visible
    #[error("unable to find deployment bucket export '{export}'")]
    BucketNotFound { export: String },

    /// One artifact could not be read or uploaded
    #[error("failed uploading '{key}': {source}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },

    /// One or more artifacts in a batch failed to upload
    #[error("{} artifact upload(s) failed: {}", .failures.len(), summarize_failures(.failures))]
    UploadsFailed { failures: Vec<UploadFailure> },

    /// Remote read failed for a reason other than absence
    #[error("failed reading '{key}' from bucket '{bucket}': {source}")]
    Download {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    /// Emptying or removing the deployment bucket failed
    #[error("failed to empty bucket '{bucket}': {source}")]
    BucketTeardown {
        bucket: String,
        #[source]
        source: StoreError,
    },

    /// Provider could not be queried (status, exports)
    #[error("stack provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Stage deployment record could not be written
    #[error("failed to save deployment record: {0}")]
    Record(#[from] RecordError),

    /// Another run holds the state directory lock
    #[error("another deployment is in progress (lock held on {path})")]
    Locked { path: PathBuf },

    /// Configuration error
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Invalid stage name
    #[error("invalid stage name '{0}': use letters, digits, '-' or '_'")]
    InvalidStage(String),

    /// Hashing failed in a context where it must not be tolerated
    #[error(transparent)]
    Hash(#[from] HashError),

    /// Hook invocation failure (only surfaced when a caller opts in)
    #[error(transparent)]
    Hook(#[from] HookError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LiftoffError {
    /// Whether re-running the same command may succeed without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LiftoffError::PollTimeout { .. }
                | LiftoffError::Cancelled
                | LiftoffError::BucketNotFound { .. }
                | LiftoffError::Locked { .. }
        )
    }
}

fn summarize_failures(failures: &[UploadFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.key, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}
