//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Atomic writes and the state lock
//! - `repositories/` - Project descriptor (JSON) and stage records (TOML)
//! - `events/` - Deploy event sinks (log, NDJSON)
//! - `cloud/` - Local and AWS backends for stacks, objects and hooks
//! - `hashing` - Directory-backed function hasher

pub mod cloud;
pub mod events;
pub mod fs;
pub mod hashing;
pub mod repositories;

// Re-export for convenience
pub use cloud::local::{LocalCloud, LocalHookInvoker, LocalObjectStore, LocalStackProvider};
pub use events::{JsonEventSink, LogEventSink};
pub use fs::{atomic_write, StateLock};
pub use hashing::DirectoryFunctionHasher;
pub use repositories::{JsonProjectRepository, TomlRecordRepository};
