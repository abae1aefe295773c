//! CXS CLI library.
//!
//! Argument parsing, command implementations and output formatting for the
//! `cxs` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod workspace;

pub use error::CliError;
