//! FunctionHasher port - content fingerprint of one deployable function

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entities::FunctionDescriptor;
use crate::domain::value_objects::ContentHash;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("no compiled output found for entry point '{entry_point}'")]
    NotFound { entry_point: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Deterministic fingerprint of a function's compiled output.
///
/// Identical compiled bytes must always give the same hash, whatever the
/// directory enumeration order, timestamps or permissions.
pub trait FunctionHasher: Send + Sync {
    fn hash(&self, function: &FunctionDescriptor) -> Result<ContentHash, HashError>;
}
