//! Directory-backed cloud
//!
//! Stack provider, versioned object store and hook invoker sharing one root
//! directory. Used by default and by the test suites.

mod hooks;
mod object_store;
mod stack_provider;

use std::path::{Path, PathBuf};

pub use hooks::{LocalHookInvoker, FAILING_HOOKS, INVOCATION_LOG};
pub use object_store::{LocalObjectStore, LOCAL_URL_SCHEME};
pub use stack_provider::LocalStackProvider;

/// The three local services wired to the same root
pub struct LocalCloud {
    pub root: PathBuf,
    pub objects: LocalObjectStore,
    pub stacks: LocalStackProvider,
    pub hooks: LocalHookInvoker,
}

impl LocalCloud {
    pub fn open(root: &Path) -> Self {
        let objects = LocalObjectStore::new(root);
        Self {
            root: root.to_path_buf(),
            stacks: LocalStackProvider::new(root, objects.clone()),
            hooks: LocalHookInvoker::new(root),
            objects,
        }
    }
}
