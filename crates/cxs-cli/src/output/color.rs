//! Minimal ANSI styling for terminal output.

use std::fmt;
use std::io::IsTerminal;

use cxs_common_config::vars;

/// When to emit ANSI escape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when the stream is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Collapse `Auto` for a stream, given whether it is a terminal.
    pub fn resolve(self, is_terminal: bool) -> Self {
        match self {
            Self::Auto if is_terminal && std::env::var_os(vars::NO_COLOR).is_none() => Self::Always,
            Self::Auto => Self::Never,
            mode => mode,
        }
    }

    /// Mode for stdout.
    pub fn for_stdout(self) -> Self {
        self.resolve(std::io::stdout().is_terminal())
    }

    /// Mode for stderr.
    pub fn for_stderr(self) -> Self {
        self.resolve(std::io::stderr().is_terminal())
    }

    pub fn enabled(self) -> bool {
        matches!(self, Self::Always)
    }
}

impl From<clap::ColorChoice> for ColorMode {
    fn from(choice: clap::ColorChoice) -> Self {
        match choice {
            clap::ColorChoice::Auto => Self::Auto,
            clap::ColorChoice::Always => Self::Always,
            clap::ColorChoice::Never => Self::Never,
        }
    }
}

/// Foreground colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Cyan,
    BrightBlack,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Self::Red => "31",
            Self::Green => "32",
            Self::Yellow => "33",
            Self::Cyan => "36",
            Self::BrightBlack => "90",
        }
    }
}

/// Text with optional color and weight.
#[derive(Debug, Clone)]
pub struct Styled {
    text: String,
    color: Option<Color>,
    bold: bool,
    mode: ColorMode,
}

impl Styled {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: false,
            mode: ColorMode::Never,
        }
    }

    /// Styles are only rendered when `mode` is `Always`; `Auto` must be
    /// resolved against a stream first.
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl fmt::Display for Styled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mode.enabled() || (self.color.is_none() && !self.bold) {
            return f.write_str(&self.text);
        }

        let mut codes = Vec::with_capacity(2);
        if self.bold {
            codes.push("1");
        }
        if let Some(color) = self.color {
            codes.push(color.code());
        }
        write!(f, "\x1b[{}m{}\x1b[0m", codes.join(";"), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_when_disabled() {
        let styled = Styled::new("error").fg(Color::Red).bold();
        assert_eq!(styled.to_string(), "error");
    }

    #[test]
    fn test_ansi_when_forced() {
        let styled = Styled::new("error")
            .with_color_mode(ColorMode::Always)
            .fg(Color::Red)
            .bold();
        assert_eq!(styled.to_string(), "\x1b[1;31merror\x1b[0m");
    }

    #[test]
    fn test_resolve_auto() {
        assert_eq!(ColorMode::Never.resolve(true), ColorMode::Never);
        assert_eq!(ColorMode::Always.resolve(false), ColorMode::Always);
        assert_eq!(ColorMode::Auto.resolve(false), ColorMode::Never);
    }
}
