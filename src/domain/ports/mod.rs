//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod clock;
pub mod deploy_events;
pub mod function_hasher;
pub mod hook_invoker;
pub mod object_store;
pub mod project_repository;
pub mod record_repository;
pub mod stack_provider;

pub use clock::{Clock, ManualClock, SystemClock};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use function_hasher::{FunctionHasher, HashError};
pub use hook_invoker::{HookError, HookInvoker};
pub use object_store::{
    ObjectPage, ObjectStore, ObjectVersion, StoreError, StoreResult, VersionCursor, VersionPage,
};
pub use project_repository::ProjectRepository;
pub use record_repository::{RecordError, RecordRepository, RecordResult};
pub use stack_provider::{
    CreateOutcome, ExportPage, ProviderError, ProviderResult, StackExport, StackProvider,
    UpdateOutcome,
};
