//! Output formatting utilities for CLI commands.

use serde::Serialize;
use std::io::Write;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

pub mod color;

/// Types that can be rendered as command output
pub trait FormattedOutput: Serialize {
    fn format_text(&self, ctx: &CommandContext) -> String;

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Print formatted output to stdout
pub fn print_output<T: FormattedOutput>(ctx: &CommandContext, value: &T) -> Result<(), CliError> {
    write_output(ctx, value, std::io::stdout().lock())
}

/// Print formatted output to a writer
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput,
    W: Write,
{
    let output = match ctx.format {
        OutputFormat::Text => value.format_text(ctx),
        OutputFormat::Json => value.format_json().map_err(|e| {
            CliError::Other(anyhow::anyhow!("JSON serialization failed: {}", e))
        })?,
    };

    writeln!(writer, "{}", output.trim_end())?;
    Ok(())
}
