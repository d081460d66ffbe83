//! File System Helpers
//!
//! Atomic writes and the state directory lock.

mod local;
mod lock;

pub use local::atomic_write;
pub use lock::StateLock;
