//! HookInvoker port - fires post-deploy functions

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("hook '{name}' could not be invoked: {message}")]
    Invoke { name: String, message: String },
    #[error("hook '{name}' failed: {message}")]
    Failed { name: String, message: String },
}

impl HookError {
    pub fn hook_name(&self) -> &str {
        match self {
            HookError::Invoke { name, .. } | HookError::Failed { name, .. } => name,
        }
    }
}

/// Invokes a deployed function by name, without arguments
pub trait HookInvoker: Send + Sync {
    fn invoke(&self, function_name: &str) -> Result<(), HookError>;
}
