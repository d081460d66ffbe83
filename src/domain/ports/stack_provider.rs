//! StackProvider port - the infrastructure-stack service (CloudFormation-like)
//!
//! Only the raw calls live here. Waiting, retrying and interpreting statuses
//! is the job of `application::StackLifecycle`.

use thiserror::Error;

use crate::domain::value_objects::StackStatus;

/// Result type for stack provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Stack provider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider received the request and refused it
    #[error("request rejected: {0}")]
    Rejected(String),
    /// The provider could not be reached or answered garbage
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a create request that was not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// A stack with that name exists; callers continue with an update
    AlreadyExists,
}

/// Outcome of an update request that was not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updating,
    /// Template identical to the live one; nothing to wait for
    NoChanges,
}

/// A named value published by some stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackExport {
    pub name: String,
    pub value: String,
}

/// One page of the account-wide export listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPage {
    pub exports: Vec<StackExport>,
    pub next_token: Option<String>,
}

/// Abstract infrastructure-stack service
///
/// Implementations:
/// - `LocalStackProvider` - directory-backed emulation
/// - `AwsStackProvider` - CloudFormation (feature `aws`)
pub trait StackProvider: Send + Sync {
    /// Create a stack from an inline template
    fn create_stack(&self, name: &str, template_body: &str) -> ProviderResult<CreateOutcome>;

    /// Update a stack from a template stored at `template_url`
    fn update_stack(&self, name: &str, template_url: &str) -> ProviderResult<UpdateOutcome>;

    /// Request deletion of a stack
    fn delete_stack(&self, name: &str) -> ProviderResult<()>;

    /// Current status, `StackStatus::Absent` when the stack does not exist
    fn stack_status(&self, name: &str) -> ProviderResult<StackStatus>;

    /// One page of exports; pass the previous page's `next_token` to continue
    fn list_exports(&self, next_token: Option<&str>) -> ProviderResult<ExportPage>;
}
