//! Ledger column schema and run status values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Number of columns in every ledger row.
pub const COLUMN_COUNT: usize = 8;

/// Canonical ledger header, in column order.
pub const LEDGER_HEADER: [&str; COLUMN_COUNT] = [
    "timestamp",
    "session_id",
    "cycle_id",
    "contract_ref",
    "agent_id",
    "tokens_or_runtime",
    "status",
    "notes",
];

/// Accepted values of the `status` column, in [`RunStatus`] order.
pub const VALID_STATUSES: &[&str] = RunStatus::VARIANTS;

/// Columns that must be non-empty after trimming.
pub const REQUIRED_FIELDS: [usize; 6] = [
    column::TIMESTAMP,
    column::SESSION_ID,
    column::CYCLE_ID,
    column::CONTRACT_REF,
    column::AGENT_ID,
    column::STATUS,
];

/// Column positions.
pub mod column {
    pub const TIMESTAMP: usize = 0;
    pub const SESSION_ID: usize = 1;
    pub const CYCLE_ID: usize = 2;
    pub const CONTRACT_REF: usize = 3;
    pub const AGENT_ID: usize = 4;
    pub const TOKENS_OR_RUNTIME: usize = 5;
    pub const STATUS: usize = 6;
    pub const NOTES: usize = 7;
}

/// Outcome of a logged run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString, IntoStaticStr, VariantNames)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RunStatus {
    /// Run finished successfully.
    Completed,
    /// Run failed.
    Failed,
    /// Run produced part of its output.
    Partial,
    /// Run is still going.
    InProgress,
    /// Run was stopped before finishing.
    Cancelled,
}

impl RunStatus {
    /// All statuses, in ledger order.
    pub fn all() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter()
    }

    /// The literal written to the `status` column.
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Parse an exact status literal.
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

/// Whether `value` is one of [`VALID_STATUSES`]. Matching is exact.
pub fn is_valid_status(value: &str) -> bool {
    VALID_STATUSES.contains(&value)
}
