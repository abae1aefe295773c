//! Ledger error types.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::schema::LEDGER_HEADER;

/// Why a single row was rejected.
///
/// Variants are ordered by check precedence: a row with several problems
/// reports the first one in this order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("expected {expected} columns, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("invalid timestamp format: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("invalid status '{value}', must be one of: {}", .allowed.join(", "))]
    InvalidStatus {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("required field '{field}' is empty")]
    MissingRequiredField { field: &'static str },
}

impl ValidationError {
    /// Stable identifier for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::InvalidTimestamp { .. } => "invalid_timestamp",
            Self::InvalidStatus { .. } => "invalid_status",
            Self::MissingRequiredField { .. } => "missing_required_field",
        }
    }
}

/// A stored header that differs from [`LEDGER_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMismatch {
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl HeaderMismatch {
    pub(crate) fn new(found: Vec<String>) -> Self {
        Self {
            expected: LEDGER_HEADER.iter().map(|s| s.to_string()).collect(),
            found,
        }
    }
}

impl fmt::Display for HeaderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ledger header mismatch: expected [{}], found [{}]",
            self.expected.join(", "),
            self.found.join(", ")
        )
    }
}

/// Ledger store errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    HeaderMismatch(HeaderMismatch),

    #[error("ledger file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LedgerError {
    /// Stable identifier for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.kind(),
            Self::HeaderMismatch(_) => "header_mismatch",
            Self::FileNotFound { .. } => "file_not_found",
            Self::Io { .. } => "io_failure",
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, err: csv::Error) -> Self {
        Self::io(path, err.into())
    }
}
