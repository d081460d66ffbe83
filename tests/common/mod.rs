//! Common test utilities for Liftoff scenario tests.
//!
//! This module provides:
//! - `TestEnv`: an isolated project directory plus helpers to run the binary
//! - Fixtures: a two-function project as the build step would leave it

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
