//! Cycle files and the changelog timeline.

use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::error::CliError;

/// Cycle id recorded when no cycle has been started.
pub const UNSET_CYCLE: &str = "unset";

/// Ledger timestamp layout, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Current time as a ledger timestamp.
pub fn utc_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Cycle id for a new cycle started at `now`.
///
/// Named cycles get a date suffix; unnamed ones are stamped to the second.
pub fn cycle_id<Tz>(name: Option<&str>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{name}-{}", now.format("%Y%m%d")),
        None => format!("cycle-{}", now.format("%Y%m%d-%H%M%S")),
    }
}

/// Read the current cycle id, trimmed.
///
/// `None` when no cycle file exists. An existing blank file yields an empty
/// id, which the ledger rejects as a missing `cycle_id`.
pub fn read_current_cycle(path: &Path) -> Result<Option<String>, CliError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents.trim().to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CliError::io_with_path("Cannot read the current cycle", e, path)),
    }
}

/// Replace the current cycle id.
pub fn write_current_cycle(path: &Path, cycle_id: &str) -> Result<(), CliError> {
    ensure_parent(path)?;
    fs::write(path, format!("{cycle_id}\n"))
        .map_err(|e| CliError::io_with_path("Cannot write the current cycle", e, path))?;
    debug!(path = %path.display(), cycle_id, "current cycle updated");
    Ok(())
}

/// One cycle-start entry of the Markdown changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub cycle_id: String,
    pub previous_cycle: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub details: String,
}

impl ChangelogEntry {
    /// Markdown block appended to the timeline.
    ///
    /// Lines inside the block end in two spaces so Markdown renders them as
    /// hard line breaks.
    pub fn render(&self) -> String {
        format!(
            "\n---\n\n## Cycle Started: {}\n\n\
             **Date:** {}  \n\
             **Previous Cycle:** {}  \n\
             **Event:** New cycle initiated  \n\
             **Details:** {}\n",
            self.cycle_id, self.date, self.previous_cycle, self.details
        )
    }
}

/// Append `entry` to the changelog, creating the file if needed.
pub fn append_changelog(path: &Path, entry: &ChangelogEntry) -> Result<(), CliError> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CliError::io_with_path("Cannot open the changelog", e, path))?;
    file.write_all(entry.render().as_bytes())
        .map_err(|e| CliError::io_with_path("Cannot write the changelog", e, path))?;
    debug!(path = %path.display(), cycle_id = %entry.cycle_id, "changelog entry appended");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), CliError> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent)
            .map_err(|e| CliError::io_with_path("Cannot create directory", e, parent)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cxs_test_utils::temp_dir;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_cycle_id_formats() {
        let now = at(9, 5, 7);
        let cases = vec![
            (Some("feature-auth"), "feature-auth-20250115"),
            (Some("  spaced  "), "spaced-20250115"),
            (Some(""), "cycle-20250115-090507"),
            (None, "cycle-20250115-090507"),
        ];
        for (name, expected) in cases {
            assert_eq!(cycle_id(name, &now), expected, "{name:?}");
        }
    }

    #[test]
    fn test_utc_timestamp_shape() {
        let ts = utc_timestamp();
        assert_eq!(ts.len(), 20);
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_current_cycle_round_trip() {
        let dir = temp_dir();
        let path = dir.path().join("cycles").join("current");

        assert_eq!(read_current_cycle(&path).unwrap(), None);

        write_current_cycle(&path, "sprint-20250115").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "sprint-20250115\n");
        assert_eq!(
            read_current_cycle(&path).unwrap().as_deref(),
            Some("sprint-20250115")
        );
    }

    #[test]
    fn test_blank_cycle_file_reads_as_empty_id() {
        let dir = temp_dir();
        let path = dir.path().join("current");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(read_current_cycle(&path).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_changelog_entries_accumulate() {
        let dir = temp_dir();
        let path = dir.path().join("ledger").join("CHANGELOG_TIMELINE.md");
        let entry = ChangelogEntry {
            cycle_id: "alpha-20250115".to_string(),
            previous_cycle: UNSET_CYCLE.to_string(),
            date: "2025-01-15".to_string(),
            details: "Kickoff".to_string(),
        };

        append_changelog(&path, &entry).unwrap();
        append_changelog(&path, &entry).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("## Cycle Started: alpha-20250115").count(), 2);
        assert!(contents.contains("**Previous Cycle:** unset  \n"));
        assert!(contents.contains("**Details:** Kickoff\n"));
    }
}
