//! Stage deployment record entity - what was deployed last, per stage
//!
//! The record is the local half of the trust check: it is only valid for
//! incremental decisions when its timestamp matches the remote marker.
//! It's a pure data structure - I/O is handled by `RecordRepository`.

use std::collections::BTreeMap;

use crate::domain::value_objects::{ContentHash, FunctionVersion};

/// Version and fingerprint of one function at its last deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedFunctionVersion {
    version: FunctionVersion,
    /// `None` when the artifact could not be hashed at deploy time
    hash: Option<ContentHash>,
}

impl DeployedFunctionVersion {
    pub fn new(version: FunctionVersion, hash: Option<ContentHash>) -> Self {
        Self { version, hash }
    }

    pub fn version(&self) -> &FunctionVersion {
        &self.version
    }

    pub fn hash(&self) -> Option<&ContentHash> {
        self.hash.as_ref()
    }

    /// True only when both sides have a hash and they are equal
    pub fn matches(&self, hash: Option<&ContentHash>) -> bool {
        match (self.hash.as_ref(), hash) {
            (Some(recorded), Some(current)) => recorded == current,
            _ => false,
        }
    }
}

/// Per-stage deployment history
///
/// Keys are function entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDeploymentRecord {
    version: u32,
    last_compilation_timestamp: Option<String>,
    functions: BTreeMap<String, DeployedFunctionVersion>,
}

impl Default for StageDeploymentRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl StageDeploymentRecord {
    /// Current on-disk format version
    pub const FORMAT_VERSION: u32 = 1;

    /// Empty record: nothing deployed yet
    pub fn new() -> Self {
        Self {
            version: Self::FORMAT_VERSION,
            last_compilation_timestamp: None,
            functions: BTreeMap::new(),
        }
    }

    /// Record read back from storage
    pub fn restore(
        version: u32,
        last_compilation_timestamp: Option<String>,
        functions: BTreeMap<String, DeployedFunctionVersion>,
    ) -> Self {
        Self {
            version,
            last_compilation_timestamp,
            functions,
        }
    }

    /// Start a record for the compilation that is about to be deployed
    pub fn for_compilation(timestamp: impl Into<String>) -> Self {
        Self {
            last_compilation_timestamp: Some(timestamp.into()),
            ..Self::new()
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn last_compilation_timestamp(&self) -> Option<&str> {
        self.last_compilation_timestamp.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn get(&self, entry_point: &str) -> Option<&DeployedFunctionVersion> {
        self.functions.get(entry_point)
    }

    pub fn set(&mut self, entry_point: impl Into<String>, deployed: DeployedFunctionVersion) {
        self.functions.insert(entry_point.into(), deployed);
    }

    pub fn contains(&self, entry_point: &str) -> bool {
        self.functions.contains_key(entry_point)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &DeployedFunctionVersion)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the remote trust marker vouches for this record
    pub fn is_trusted_by(&self, marker: Option<&str>) -> bool {
        match (self.last_compilation_timestamp.as_deref(), marker) {
            (Some(local), Some(remote)) => local == remote,
            _ => false,
        }
    }
}
