//! Log-run command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, ValueHint};
use cxs_ledger::{LedgerRow, LedgerStore};
use serde::Serialize;
use tracing::info;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::color::{Color, Styled};
use crate::output::{print_output, FormattedOutput};
use crate::workspace;

/// Append one run record to the ledger
#[derive(Debug, Parser)]
pub struct LogRunCommand {
    /// Session ID
    #[arg(short, long)]
    pub session: String,

    /// Contract reference
    #[arg(short, long)]
    pub contract: String,

    /// Agent ID
    #[arg(short, long)]
    pub agent: String,

    /// Run status (completed, failed, partial, in-progress, cancelled)
    #[arg(long)]
    pub status: String,

    /// Tokens used or runtime
    #[arg(short, long)]
    pub runtime: Option<String>,

    /// Free-form notes
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Cycle ID [default: current cycle]
    #[arg(long)]
    pub cycle: Option<String>,

    /// Timestamp in ISO 8601 [default: now, UTC]
    #[arg(short, long)]
    pub timestamp: Option<String>,

    /// Ledger file to append to instead of the configured one
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub ledger: Option<PathBuf>,

    /// Hold an exclusive lock on the ledger while appending
    #[arg(long)]
    pub lock: bool,
}

impl LogRunCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        // An empty `--cycle` falls back to the current cycle.
        let cycle_id = match self.cycle.as_deref().filter(|c| !c.is_empty()) {
            Some(cycle) => cycle.to_string(),
            None => workspace::read_current_cycle(&ctx.paths.current_cycle)?
                .unwrap_or_else(|| workspace::UNSET_CYCLE.to_string()),
        };

        let row = LedgerRow {
            timestamp: self.timestamp.clone().unwrap_or_else(workspace::utc_timestamp),
            session_id: self.session.clone(),
            cycle_id,
            contract_ref: self.contract.clone(),
            agent_id: self.agent.clone(),
            tokens_or_runtime: self.runtime.clone().unwrap_or_default(),
            status: self.status.clone(),
            notes: self.notes.clone().unwrap_or_default(),
        };

        let ledger = self.ledger.clone().unwrap_or_else(|| ctx.paths.ledger.clone());
        let store = LedgerStore::new(&ledger).with_locking(self.lock || ctx.config.ledger.lock);
        store.append_row(&row.as_record())?;

        info!(ledger = %ledger.display(), cycle = %row.cycle_id, "run logged");
        print_output(ctx, &LogRunOutput { ledger, row })
    }
}

/// Result of a successful append
#[derive(Debug, Serialize)]
pub struct LogRunOutput {
    pub ledger: PathBuf,
    pub row: LedgerRow,
}

impl FormattedOutput for LogRunOutput {
    fn format_text(&self, ctx: &CommandContext) -> String {
        let check = Styled::new("✓").with_color_mode(ctx.color).fg(Color::Green);
        let mut out = format!("{check} Run logged to {}\n", self.ledger.display());

        let fields = [
            ("session", &self.row.session_id),
            ("cycle", &self.row.cycle_id),
            ("contract", &self.row.contract_ref),
            ("agent", &self.row.agent_id),
            ("status", &self.row.status),
            ("timestamp", &self.row.timestamp),
        ];
        for (label, value) in fields {
            let _ = writeln!(out, "  {:<10} {value}", format!("{label}:"));
        }
        if !self.row.tokens_or_runtime.is_empty() {
            let _ = writeln!(out, "  {:<10} {}", "runtime:", self.row.tokens_or_runtime);
        }
        if !self.row.notes.is_empty() {
            let _ = writeln!(out, "  {:<10} {}", "notes:", self.row.notes);
        }
        out
    }
}
