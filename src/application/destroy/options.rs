//! Destroy Options

use crate::domain::value_objects::Stage;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    pub stage: Stage,
}

impl DestroyOptions {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }
}
