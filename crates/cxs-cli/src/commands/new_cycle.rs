//! New-cycle command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::color::{Color, Styled};
use crate::output::{print_output, FormattedOutput};
use crate::workspace::{self, ChangelogEntry, UNSET_CYCLE};

/// Start a new cycle and make it current
#[derive(Debug, Parser)]
pub struct NewCycleCommand {
    /// Cycle name prefix; the date is appended
    #[arg(short, long)]
    pub name: Option<String>,

    /// Description recorded in the changelog
    #[arg(short, long)]
    pub description: Option<String>,

    /// Append an entry to the changelog timeline
    #[arg(short, long)]
    pub log_changelog: bool,
}

impl NewCycleCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        if let Some(name) = &self.name {
            if name.chars().any(|c| c.is_control() || c == '/' || c == '\\') {
                return Err(CliError::user_with_hint(
                    format!("Invalid cycle name: {name:?}"),
                    "Use letters, digits, dashes or dots",
                ));
            }
        }

        let now = Local::now();
        let cycle_id = workspace::cycle_id(self.name.as_deref(), &now);
        let cycle_file = ctx.paths.current_cycle.clone();

        let previous_cycle = workspace::read_current_cycle(&cycle_file)?
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| UNSET_CYCLE.to_string());
        workspace::write_current_cycle(&cycle_file, &cycle_id)?;

        let changelog = if self.log_changelog {
            let entry = ChangelogEntry {
                cycle_id: cycle_id.clone(),
                previous_cycle: previous_cycle.clone(),
                date: now.format("%Y-%m-%d").to_string(),
                details: self
                    .description
                    .clone()
                    .unwrap_or_else(|| "Cycle created via cxs new-cycle".to_string()),
            };
            workspace::append_changelog(&ctx.paths.changelog, &entry)?;
            Some(ctx.paths.changelog.clone())
        } else {
            None
        };

        info!(cycle_id = %cycle_id, previous = %previous_cycle, "new cycle started");
        print_output(
            ctx,
            &NewCycleOutput {
                cycle_id,
                previous_cycle,
                cycle_file,
                changelog,
            },
        )
    }
}

/// Result of starting a cycle
#[derive(Debug, Serialize)]
pub struct NewCycleOutput {
    pub cycle_id: String,
    pub previous_cycle: String,
    pub cycle_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<PathBuf>,
}

impl FormattedOutput for NewCycleOutput {
    fn format_text(&self, ctx: &CommandContext) -> String {
        let check = Styled::new("✓").with_color_mode(ctx.color).fg(Color::Green);
        let mut out = format!("{check} New cycle created: {}\n", self.cycle_id);
        let _ = writeln!(out, "  Previous cycle: {}", self.previous_cycle);
        let _ = writeln!(out, "  File updated: {}", self.cycle_file.display());
        if let Some(changelog) = &self.changelog {
            let _ = writeln!(out, "  Changelog updated: {}", changelog.display());
        }
        out
    }
}
