//! Destroy Result

use crate::domain::value_objects::Stage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyResult {
    pub stack: String,
    pub stage: Stage,
    /// False when there was no stack to delete
    pub stack_existed: bool,
    pub bucket: Option<String>,
    /// Objects and object versions removed from the bucket
    pub removed_objects: usize,
    pub warnings: Vec<String>,
}

impl DestroyResult {
    pub fn new(stack: impl Into<String>, stage: Stage) -> Self {
        Self {
            stack: stack.into(),
            stage,
            stack_existed: false,
            bucket: None,
            removed_objects: 0,
            warnings: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
