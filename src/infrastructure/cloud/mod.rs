//! Cloud backends implementing the stack, object and hook ports

#[cfg(feature = "aws")]
pub mod aws;
pub mod local;
