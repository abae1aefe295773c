//! Typed ledger row.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schema::{column, RunStatus, COLUMN_COUNT};
use crate::validator::validate_row;

/// One run record with named fields.
///
/// The status is kept as the raw column text so that rows read back from
/// disk can be represented even when they would fail validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub timestamp: String,
    pub session_id: String,
    pub cycle_id: String,
    pub contract_ref: String,
    pub agent_id: String,
    pub tokens_or_runtime: String,
    pub status: String,
    pub notes: String,
}

impl LedgerRow {
    /// Start building a row.
    pub fn builder() -> LedgerRowBuilder {
        LedgerRowBuilder::default()
    }

    /// Build a row from a positional record.
    ///
    /// Only the column count is enforced here; call [`LedgerRow::validate`]
    /// for the full rule set.
    pub fn from_record<S: AsRef<str>>(record: &[S]) -> Result<Self, ValidationError> {
        if record.len() != COLUMN_COUNT {
            return Err(ValidationError::SchemaMismatch {
                expected: COLUMN_COUNT,
                actual: record.len(),
            });
        }

        let field = |index: usize| record[index].as_ref().to_string();
        Ok(Self {
            timestamp: field(column::TIMESTAMP),
            session_id: field(column::SESSION_ID),
            cycle_id: field(column::CYCLE_ID),
            contract_ref: field(column::CONTRACT_REF),
            agent_id: field(column::AGENT_ID),
            tokens_or_runtime: field(column::TOKENS_OR_RUNTIME),
            status: field(column::STATUS),
            notes: field(column::NOTES),
        })
    }

    /// Borrow the fields in column order.
    pub fn as_record(&self) -> [&str; COLUMN_COUNT] {
        [
            self.timestamp.as_str(),
            self.session_id.as_str(),
            self.cycle_id.as_str(),
            self.contract_ref.as_str(),
            self.agent_id.as_str(),
            self.tokens_or_runtime.as_str(),
            self.status.as_str(),
            self.notes.as_str(),
        ]
    }

    /// Consume the row into its fields in column order.
    pub fn into_record(self) -> [String; COLUMN_COUNT] {
        [
            self.timestamp,
            self.session_id,
            self.cycle_id,
            self.contract_ref,
            self.agent_id,
            self.tokens_or_runtime,
            self.status,
            self.notes,
        ]
    }

    /// Parsed status, if the column holds a known value.
    pub fn run_status(&self) -> Option<RunStatus> {
        RunStatus::parse(&self.status)
    }

    /// Run the row validator on this row.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_row(&self.as_record())
    }
}

/// Builder for [`LedgerRow`]. Unset fields are empty.
#[derive(Debug, Default)]
pub struct LedgerRowBuilder {
    row: LedgerRow,
}

impl LedgerRowBuilder {
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.row.timestamp = timestamp.into();
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.row.session_id = session_id.into();
        self
    }

    pub fn cycle_id(mut self, cycle_id: impl Into<String>) -> Self {
        self.row.cycle_id = cycle_id.into();
        self
    }

    pub fn contract_ref(mut self, contract_ref: impl Into<String>) -> Self {
        self.row.contract_ref = contract_ref.into();
        self
    }

    pub fn agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.row.agent_id = agent_id.into();
        self
    }

    pub fn tokens_or_runtime(mut self, tokens_or_runtime: impl Into<String>) -> Self {
        self.row.tokens_or_runtime = tokens_or_runtime.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.row.status = status.into();
        self
    }

    pub fn run_status(self, status: RunStatus) -> Self {
        self.status(status.as_str())
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.row.notes = notes.into();
        self
    }

    /// Finish the row and validate it.
    pub fn build(self) -> Result<LedgerRow, ValidationError> {
        self.row.validate()?;
        Ok(self.row)
    }
}
