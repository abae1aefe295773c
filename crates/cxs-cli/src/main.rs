//! CXS CLI - Context Exchange System
//!
//! Main entry point for the `cxs` binary.

use std::process::ExitCode;

use clap::Parser;
use cxs_cli::cli::{Cli, OutputFormat};
use cxs_cli::error::ErrorFormatter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = cli.format;
    let formatter = ErrorFormatter::new()
        .color_mode(cli.color_mode())
        .verbose(cli.verbose > 0);

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = e.code(), "command failed");
            match format {
                OutputFormat::Text => formatter.print(&e),
                OutputFormat::Json => eprintln!("{}", formatter.format_json(&e)),
            }
            e.exit_code()
        }
    }
}
