//! Run ledger for the Context Exchange System.
//!
//! The ledger is an append-only CSV file with a fixed eight-column header.
//! This crate owns the column schema, the row validator shared by the
//! append and audit paths, and the store that reads and writes the file.

mod error;
mod report;
mod row;
pub mod schema;
mod store;
mod validator;

pub use error::{HeaderMismatch, LedgerError, ValidationError};
pub use report::{Finding, ValidationReport};
pub use row::{LedgerRow, LedgerRowBuilder};
pub use schema::{RunStatus, COLUMN_COUNT, LEDGER_HEADER, REQUIRED_FIELDS, VALID_STATUSES};
pub use store::{append_row, ensure_header, validate_file, LedgerStore};
pub use validator::validate_row;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
