//! Validate command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, ValueHint};
use cxs_ledger::{LedgerStore, ValidationReport};
use serde::Serialize;
use tracing::warn;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::color::{Color, Styled};
use crate::output::{print_output, FormattedOutput};

/// Audit every row of the ledger
#[derive(Debug, Parser)]
pub struct ValidateCommand {
    /// Ledger file to check [default: configured ledger]
    #[arg(value_hint = ValueHint::FilePath)]
    pub path: Option<PathBuf>,
}

impl ValidateCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let path = self.path.clone().unwrap_or_else(|| ctx.paths.ledger.clone());
        let store = LedgerStore::new(&path);
        let report = cxs_common_log::timed!("validate_ledger", store.validate_file())?;

        print_output(ctx, &ValidationOutput { report: &report })?;

        if report.overall_valid {
            return Ok(());
        }

        warn!(ledger = %path.display(), errors = report.error_count(), "ledger failed validation");
        Err(CliError::Validation {
            message: format!("ledger is invalid: {} error(s) found", report.error_count()),
            field: None,
            expected: None,
            actual: None,
        })
    }
}

/// Full-ledger audit results
#[derive(Debug, Serialize)]
pub struct ValidationOutput<'a> {
    #[serde(flatten)]
    pub report: &'a ValidationReport,
}

impl FormattedOutput for ValidationOutput<'_> {
    fn format_text(&self, ctx: &CommandContext) -> String {
        let report = self.report;
        let cross = Styled::new("✗").with_color_mode(ctx.color).fg(Color::Red);
        let mut out = format!("Validating {}\n", report.path.display());

        if let Some(mismatch) = &report.header_mismatch {
            let _ = writeln!(out, "  {cross} line 1: {mismatch}");
        }
        for finding in &report.findings {
            let _ = writeln!(out, "  {cross} line {}: {}", finding.line, finding.error);
        }

        let _ = writeln!(out, "Rows checked: {}", report.row_count);
        let _ = writeln!(out, "Errors found: {}", report.error_count());

        let verdict = if report.overall_valid {
            Styled::new("✓ Ledger is valid")
                .with_color_mode(ctx.color)
                .fg(Color::Green)
        } else {
            Styled::new("✗ Ledger is invalid")
                .with_color_mode(ctx.color)
                .fg(Color::Red)
                .bold()
        };
        let _ = writeln!(out, "{verdict}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxs_test_utils::temp_file;

    const HEADER: &str =
        "timestamp,session_id,cycle_id,contract_ref,agent_id,tokens_or_runtime,status,notes\n";

    #[test]
    fn test_clean_ledger_passes() {
        let (dir, path) = temp_file(&format!(
            "{HEADER}2025-01-15T10:30:00Z,s1,c1,p,a,,completed,\n"
        ));
        let ctx = CommandContext::for_root(dir.path());

        ValidateCommand { path: Some(path) }.execute(&ctx).unwrap();
    }

    #[test]
    fn test_invalid_ledger_exits_with_validation_status() {
        let (dir, path) = temp_file(&format!("{HEADER}2025-01-15T10:30:00Z,s1\n"));
        let ctx = CommandContext::for_root(dir.path());

        let err = ValidateCommand { path: Some(path) }.execute(&ctx).unwrap_err();
        assert_eq!(err.exit_status(), 5);
        assert!(err.to_string().contains("1 error(s)"));
    }

    #[test]
    fn test_missing_ledger_is_not_found() {
        let (dir, _path) = temp_file("");
        let ctx = CommandContext::for_root(dir.path());

        let err = ValidateCommand { path: None }.execute(&ctx).unwrap_err();
        assert_eq!(err.exit_status(), 6);
    }

    #[test]
    fn test_text_report_lists_findings_by_line() {
        let (dir, path) = temp_file(&format!(
            "a,b\n2025-01-15T10:30:00Z,s1,c1,p,a,,finished,\n"
        ));
        let ctx = CommandContext::for_root(dir.path());
        let report = LedgerStore::new(&path).validate_file().unwrap();

        let text = ValidationOutput { report: &report }.format_text(&ctx);

        assert!(text.contains("✗ line 1: ledger header mismatch"));
        assert!(text.contains("✗ line 2: invalid status 'finished'"));
        assert!(text.contains("Rows checked: 1"));
        assert!(text.contains("Errors found: 2"));
        assert!(text.trim_end().ends_with("✗ Ledger is invalid"));
    }

    #[test]
    fn test_json_report_flattens_fields() {
        let (_dir, path) = temp_file(HEADER);
        let report = LedgerStore::new(&path).validate_file().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&ValidationOutput { report: &report }.format_json().unwrap())
                .unwrap();
        assert_eq!(json["row_count"], 0);
        assert_eq!(json["overall_valid"], true);
        assert!(json["findings"].as_array().unwrap().is_empty());
    }
}
