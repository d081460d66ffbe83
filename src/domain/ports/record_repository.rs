//! RecordRepository port - persistence of per-stage deployment records
//!
//! Lets the state tracker load/save records without knowing the file format.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entities::StageDeploymentRecord;
use crate::domain::value_objects::Stage;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Record operation errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("unreadable deployment record {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("deployment record {path} has format version {found}, expected {expected}")]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// Abstract repository for stage deployment records
pub trait RecordRepository: Send + Sync {
    /// Load the record for `stage`; a missing record is an empty one, not an error
    fn load(&self, stage: &Stage) -> RecordResult<StageDeploymentRecord>;

    /// Replace the record for `stage`
    fn save(&self, stage: &Stage, record: &StageDeploymentRecord) -> RecordResult<()>;

    /// Forget everything about `stage`
    fn delete(&self, stage: &Stage) -> RecordResult<()>;
}
