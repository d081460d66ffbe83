//! Repository Implementations
//!
//! Concrete implementations of domain repository ports.

mod project;
mod record;

pub use project::{JsonProjectRepository, DESCRIPTOR_FILE};
pub use record::TomlRecordRepository;
