//! Configuration for CXS workspaces.
//!
//! This crate provides the types and loader for `.cxs/config.yaml` and the
//! environment variables that override it.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
