//! Destroy Use Case
//!
//! Tears one stage down:
//! - Empties and deletes the deployment bucket, versions included
//! - Deletes the stack and waits for it to disappear
//! - Forgets the local deployment record

mod options;
mod result;
mod use_case;

pub use options::DestroyOptions;
pub use result::DestroyResult;
pub use use_case::DestroyUseCase;
