//! Plan Use Case
//!
//! Answers "what would deploy do" without writing anything: resolves the
//! remote marker when the stack exists and runs the redeploy decision.

mod use_case;

pub use use_case::{PlanResult, PlanUseCase};
