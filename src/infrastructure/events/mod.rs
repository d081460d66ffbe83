//! Event Sink Implementations
//!
//! Provides concrete implementations of DeployEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - LogEventSink: Human-readable progress through `tracing`

mod json;
mod log;

pub use json::JsonEventSink;
pub use log::LogEventSink;
