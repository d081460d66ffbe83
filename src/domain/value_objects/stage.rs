//! Stage and stack naming
//!
//! A stage is a named deployment environment (`dev`, `prod`, ...). Each stage
//! owns one stack, named `{project}-{stage}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LiftoffError;

/// Validated stage name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Stage(String);

impl Stage {
    pub fn new(name: impl Into<String>) -> Result<Self, LiftoffError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(name))
        } else {
            Err(LiftoffError::InvalidStage(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self("dev".to_string())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Stage {
    type Err = LiftoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Stage {
    type Error = LiftoffError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.0
    }
}

/// Name of the stack that backs one project stage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackName(String);

impl StackName {
    pub fn for_stage(project: &str, stage: &Stage) -> Self {
        Self(format!("{}-{}", project, stage))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Export under which the stack publishes its deployment bucket name
    pub fn deployment_bucket_export(&self) -> String {
        format!("{}-DeploymentBucketName", self.0)
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
