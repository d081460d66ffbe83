//! Hook invoker for the local cloud: appends each invocation to a log file.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::domain::ports::{HookError, HookInvoker};

pub const INVOCATION_LOG: &str = "invocations.log";

/// Optional file under the root naming functions that fail, one per line
pub const FAILING_HOOKS: &str = "failing-hooks";

pub struct LocalHookInvoker {
    log_path: PathBuf,
    failing: BTreeSet<String>,
    lock: Mutex<()>,
}

impl LocalHookInvoker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let failing = std::fs::read_to_string(root.join(FAILING_HOOKS))
            .map(|list| {
                list.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            log_path: root.join(INVOCATION_LOG),
            failing,
            lock: Mutex::new(()),
        }
    }

    /// Functions that report a failure when invoked
    pub fn with_failing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(names.into_iter().map(Into::into));
        self
    }

    /// Function names invoked so far, in order
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log_path)
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl HookInvoker for LocalHookInvoker {
    fn invoke(&self, function_name: &str) -> Result<(), HookError> {
        let invoke_error = |err: std::io::Error| HookError::Invoke {
            name: function_name.to_string(),
            message: err.to_string(),
        };

        {
            let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(parent) = self.log_path.parent() {
                std::fs::create_dir_all(parent).map_err(invoke_error)?;
            }
            let mut log = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)
                .map_err(invoke_error)?;
            writeln!(log, "{}", function_name).map_err(invoke_error)?;
        }

        if self.failing.contains(function_name) {
            return Err(HookError::Failed {
                name: function_name.to_string(),
                message: "function returned an error".to_string(),
            });
        }
        Ok(())
    }
}
