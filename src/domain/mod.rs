//! Domain Layer
//!
//! This is the core of Liftoff - pure decisions without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Project descriptor and stage deployment record
//! - `value_objects/` - Immutable value types (Stage, StackStatus, ContentHash, policies)
//! - `services/` - Redeploy planner and substitution engine
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or network directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
