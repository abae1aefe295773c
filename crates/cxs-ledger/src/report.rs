//! Full-ledger validation report.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{HeaderMismatch, ValidationError};

/// A rejected data row and the line it was found on.
///
/// Lines are 1-based record positions: the header is line 1 and the first
/// data row is line 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub line: usize,
    pub error: ValidationError,
}

/// Outcome of scanning a whole ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Ledger that was scanned.
    pub path: PathBuf,
    /// Data rows scanned, header excluded.
    pub row_count: usize,
    /// Set when the first line is not the canonical header.
    pub header_mismatch: Option<HeaderMismatch>,
    /// Every rejected row, in file order.
    pub findings: Vec<Finding>,
    /// True iff the header matched and no row was rejected.
    pub overall_valid: bool,
}

impl ValidationReport {
    pub(crate) fn new(
        path: &Path,
        row_count: usize,
        header_mismatch: Option<HeaderMismatch>,
        findings: Vec<Finding>,
    ) -> Self {
        let overall_valid = header_mismatch.is_none() && findings.is_empty();
        Self {
            path: path.to_path_buf(),
            row_count,
            header_mismatch,
            findings,
            overall_valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.overall_valid
    }

    pub fn header_valid(&self) -> bool {
        self.header_mismatch.is_none()
    }

    /// Header mismatch plus rejected rows.
    pub fn error_count(&self) -> usize {
        self.findings.len() + usize::from(self.header_mismatch.is_some())
    }
}
