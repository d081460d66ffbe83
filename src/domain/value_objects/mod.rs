//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod config_warning;
mod hash;
mod policy;
mod stack_status;
mod stage;
mod version;

pub use config_warning::ConfigWarning;
pub use hash::ContentHash;
pub use policy::{CancellationFlag, PollPolicy, RetryPolicy};
pub use stack_status::StackStatus;
pub use stage::{StackName, Stage};
pub use version::FunctionVersion;
