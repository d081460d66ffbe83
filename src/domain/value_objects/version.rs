//! Function version value object
//!
//! A version is `{compilationTimestamp}/{artifactFileName}`. It doubles as the
//! object-store key of the uploaded artifact, so two compilations never share
//! a key.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionVersion(String);

impl FunctionVersion {
    pub fn mint(compilation_timestamp: &str, artifact: &str) -> Self {
        Self(format!("{}/{}", compilation_timestamp, artifact))
    }

    /// Wrap a version string read back from a deployment record
    pub fn from_recorded(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object key under which the artifact for this version is stored
    pub fn object_key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
