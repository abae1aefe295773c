//! Error formatting for CLI output.

use std::error::Error;
use std::fmt::Write as FmtWrite;

use crate::error::CliError;
use crate::output::color::{Color, ColorMode, Styled};

/// Error output formatter
pub struct ErrorFormatter {
    color_mode: ColorMode,
    verbose: bool,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self {
            color_mode: ColorMode::Auto.for_stderr(),
            verbose: false,
        }
    }

    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode.for_stderr();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Format and print an error to stderr
    pub fn print(&self, error: &CliError) {
        eprint!("{}", self.format(error));
    }

    /// Format an error to a string
    pub fn format(&self, error: &CliError) -> String {
        let mut output = String::new();

        let error_prefix = self.label(&format!("error[{}]:", error.code()), Color::Red, true);
        let _ = writeln!(output, "{error_prefix} {error}");

        if self.verbose {
            self.format_source_chain(&mut output, error);
        }

        self.format_context(&mut output, error);

        if let Some(hint) = error.hint() {
            let hint_label = self.label("hint:", Color::Cyan, true);
            let _ = writeln!(output, "{hint_label} {hint}");
        }

        output
    }

    /// Format as JSON
    pub fn format_json(&self, error: &CliError) -> String {
        let json = serde_json::json!({
            "error": {
                "code": error.code(),
                "exit_code": error.exit_status(),
                "message": error.to_string(),
                "hint": error.hint(),
            }
        });

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| error.to_string())
    }

    fn label(&self, text: &str, color: Color, bold: bool) -> Styled {
        let styled = Styled::new(text).with_color_mode(self.color_mode).fg(color);
        if bold {
            styled.bold()
        } else {
            styled
        }
    }

    fn format_source_chain(&self, output: &mut String, error: &CliError) {
        let mut current = error.source();
        if current.is_none() {
            return;
        }

        let caused_label = self.label("caused by:", Color::BrightBlack, false);
        let _ = writeln!(output, "{caused_label}");

        let mut depth = 0;
        while let Some(source) = current {
            let _ = writeln!(output, "  {depth}: {source}");
            current = source.source();
            depth += 1;
        }
    }

    fn format_context(&self, output: &mut String, error: &CliError) {
        match error {
            CliError::Io { path: Some(p), .. } => {
                let path_label = self.label("path:", Color::BrightBlack, false);
                let _ = writeln!(output, "  {path_label} {}", p.display());
            }
            CliError::NotFound {
                resource_type,
                resource_name,
                ..
            } => {
                let resource_label = self.label("resource:", Color::BrightBlack, false);
                let _ = writeln!(output, "  {resource_label} {resource_type} {resource_name}");
            }
            CliError::Validation {
                field,
                expected,
                actual,
                ..
            } => {
                if let Some(field) = field {
                    let field_label = self.label("field:", Color::BrightBlack, false);
                    let _ = writeln!(output, "  {field_label} {field}");
                }
                if let Some(expected) = expected {
                    let _ = writeln!(output, "  expected: {expected}");
                }
                if let Some(actual) = actual {
                    let _ = writeln!(output, "  actual: {actual}");
                }
            }
            _ => {}
        }
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
