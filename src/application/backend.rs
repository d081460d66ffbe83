//! Cloud backend bundle
//!
//! The three provider-facing ports a run talks to, shared between use cases.

use std::sync::Arc;

use crate::domain::ports::{HookInvoker, ObjectStore, StackProvider};

#[derive(Clone)]
pub struct CloudBackend {
    pub stacks: Arc<dyn StackProvider>,
    pub objects: Arc<dyn ObjectStore>,
    pub hooks: Arc<dyn HookInvoker>,
}

impl CloudBackend {
    pub fn new(
        stacks: Arc<dyn StackProvider>,
        objects: Arc<dyn ObjectStore>,
        hooks: Arc<dyn HookInvoker>,
    ) -> Self {
        Self {
            stacks,
            objects,
            hooks,
        }
    }
}
