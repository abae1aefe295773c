//! Row validation shared by the append and audit paths.

use crate::error::ValidationError;
use crate::schema::{column, is_valid_status, COLUMN_COUNT, LEDGER_HEADER, REQUIRED_FIELDS, VALID_STATUSES};

/// Validate one positional ledger row.
///
/// Checks run in a fixed order and stop at the first failure:
/// column count, timestamp, status, then required fields in column order.
/// Fields are inspected as given; nothing is trimmed or coerced before the
/// count, timestamp and status checks.
pub fn validate_row<S: AsRef<str>>(row: &[S]) -> Result<(), ValidationError> {
    if row.len() != COLUMN_COUNT {
        return Err(ValidationError::SchemaMismatch {
            expected: COLUMN_COUNT,
            actual: row.len(),
        });
    }

    // Presence of 'T' is the whole timestamp check.
    let timestamp = row[column::TIMESTAMP].as_ref();
    if timestamp.is_empty() || !timestamp.contains('T') {
        return Err(ValidationError::InvalidTimestamp {
            value: timestamp.to_string(),
        });
    }

    let status = row[column::STATUS].as_ref();
    if !is_valid_status(status) {
        return Err(ValidationError::InvalidStatus {
            value: status.to_string(),
            allowed: VALID_STATUSES,
        });
    }

    if let Some(&index) = REQUIRED_FIELDS
        .iter()
        .find(|&&index| row[index].as_ref().trim().is_empty())
    {
        return Err(ValidationError::MissingRequiredField {
            field: LEDGER_HEADER[index],
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxs_test_utils::valid_record;
    use proptest::prelude::*;

    fn record_with(index: usize, value: &str) -> Vec<String> {
        let mut record = valid_record();
        record[index] = value.to_string();
        record
    }

    #[test]
    fn test_accepts_well_formed_row() {
        let row = [
            "2025-01-15T10:30:00Z",
            "s1",
            "c1",
            "process.contract",
            "agent-x",
            "1500",
            "completed",
            "done",
        ];
        assert_eq!(validate_row(&row), Ok(()));
    }

    #[test]
    fn test_optional_fields_may_be_empty() {
        let mut record = valid_record();
        record[column::TOKENS_OR_RUNTIME].clear();
        record[column::NOTES].clear();
        assert_eq!(validate_row(&record), Ok(()));
    }

    #[test]
    fn test_column_count_checked_first() {
        let short = ["no-timestamp", "", "bogus"];
        assert_eq!(
            validate_row(&short),
            Err(ValidationError::SchemaMismatch { expected: 8, actual: 3 })
        );

        let mut long = valid_record();
        long.push("extra".to_string());
        assert_eq!(
            validate_row(&long),
            Err(ValidationError::SchemaMismatch { expected: 8, actual: 9 })
        );

        let empty: [&str; 0] = [];
        assert_eq!(
            validate_row(&empty),
            Err(ValidationError::SchemaMismatch { expected: 8, actual: 0 })
        );
    }

    #[test]
    fn test_timestamp_reported_before_status() {
        let row = [
            "2025-01-15 10:30:00",
            "s1",
            "c1",
            "process.contract",
            "agent-x",
            "",
            "done_wrong_status",
            "note",
        ];
        assert_eq!(
            validate_row(&row),
            Err(ValidationError::InvalidTimestamp {
                value: "2025-01-15 10:30:00".to_string()
            })
        );
    }

    #[test]
    fn test_empty_timestamp_is_invalid_timestamp() {
        let record = record_with(column::TIMESTAMP, "");
        assert!(matches!(
            validate_row(&record),
            Err(ValidationError::InvalidTimestamp { .. })
        ));

        let record = record_with(column::TIMESTAMP, "   ");
        assert!(matches!(
            validate_row(&record),
            Err(ValidationError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_timestamp_check_is_loose() {
        let record = record_with(column::TIMESTAMP, "not really a Timestamp");
        assert_eq!(validate_row(&record), Ok(()));
    }

    #[test]
    fn test_invalid_status_reports_value_and_allowed_set() {
        let record = record_with(column::STATUS, "done");
        match validate_row(&record) {
            Err(ValidationError::InvalidStatus { value, allowed }) => {
                assert_eq!(value, "done");
                assert_eq!(allowed, VALID_STATUSES);
            }
            other => panic!("Expected InvalidStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_status_reported_before_required_fields() {
        let mut record = record_with(column::STATUS, "");
        record[column::SESSION_ID].clear();
        assert!(matches!(
            validate_row(&record),
            Err(ValidationError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_missing_required_field_names_the_field() {
        let cases = vec![
            (column::SESSION_ID, "session_id"),
            (column::CYCLE_ID, "cycle_id"),
            (column::CONTRACT_REF, "contract_ref"),
            (column::AGENT_ID, "agent_id"),
        ];

        for (index, name) in cases {
            for blank in ["", " ", "\t \n"] {
                let record = record_with(index, blank);
                assert_eq!(
                    validate_row(&record),
                    Err(ValidationError::MissingRequiredField { field: name }),
                    "Failed for column {name} with {blank:?}"
                );
            }
        }
    }

    #[test]
    fn test_first_missing_field_wins() {
        let mut record = valid_record();
        record[column::AGENT_ID].clear();
        record[column::CYCLE_ID].clear();
        assert_eq!(
            validate_row(&record),
            Err(ValidationError::MissingRequiredField { field: "cycle_id" })
        );
    }

    #[test]
    fn test_validation_is_repeatable() {
        let record = record_with(column::STATUS, "nope");
        assert_eq!(validate_row(&record), validate_row(&record));
    }

    proptest! {
        #[test]
        fn test_any_well_formed_row_passes(
            timestamp in "[0-9-]{0,10}T[0-9:Z]{0,9}",
            ids in prop::collection::vec("[a-zA-Z0-9._-]{1,12}", 4),
            runtime in "\\PC{0,16}",
            status in prop::sample::select(VALID_STATUSES.to_vec()),
            notes in "\\PC{0,32}",
        ) {
            let row = vec![
                timestamp,
                ids[0].clone(),
                ids[1].clone(),
                ids[2].clone(),
                ids[3].clone(),
                runtime,
                status.to_string(),
                notes,
            ];
            prop_assert_eq!(validate_row(&row), Ok(()));
        }

        #[test]
        fn test_unknown_status_always_rejected(status in "\\PC{0,16}") {
            prop_assume!(!VALID_STATUSES.contains(&status.as_str()));
            let record = record_with(column::STATUS, &status);
            let is_invalid_status = matches!(
                validate_row(&record),
                Err(ValidationError::InvalidStatus { .. })
            );
            prop_assert!(is_invalid_status);
        }

        #[test]
        fn test_wrong_width_always_schema_mismatch(
            row in prop::collection::vec("\\PC{0,8}", 0..16usize)
        ) {
            prop_assume!(row.len() != COLUMN_COUNT);
            prop_assert_eq!(
                validate_row(&row),
                Err(ValidationError::SchemaMismatch { expected: COLUMN_COUNT, actual: row.len() })
            );
        }
    }
}
