//! Logging infrastructure for CXS.
//!
//! Logs always go to stderr so that command output on stdout stays
//! machine-readable. An optional file sink receives the same events
//! without ANSI colors.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use cxs_common_config::vars;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Distributed tracing utilities.
pub mod spans;

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include source location.
    pub source_location: bool,
    /// Include span events.
    pub span_events: bool,
    /// Colorize stderr output.
    pub ansi: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line format.
    Pretty,
    /// Single-line format.
    #[default]
    Compact,
    /// JSON structured format.
    Json,
}

impl LogFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            source_location: false,
            span_events: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::default().merge_env(|var| std::env::var(var).ok())
    }

    /// Overlay values from `lookup` on top of `self`.
    ///
    /// `CXS_LOG_LEVEL` takes precedence over `RUST_LOG`. Unparseable values
    /// are ignored.
    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup(vars::CXS_LOG_LEVEL)
            .or_else(|| lookup(vars::RUST_LOG))
            .and_then(|v| LogLevel::parse(&v));
        if let Some(level) = level {
            self.level = level;
        }

        if let Some(format) = lookup(vars::CXS_LOG_FORMAT).and_then(|v| LogFormat::parse(&v)) {
            self.format = format;
        }

        if let Some(file_path) = lookup(vars::CXS_LOG_FILE).filter(|v| !v.is_empty()) {
            self.file_path = Some(PathBuf::from(file_path));
        }

        if let Some(source_location) = lookup(vars::CXS_LOG_SOURCE) {
            self.source_location = is_truthy(&source_location);
        }

        if let Some(span_events) = lookup(vars::CXS_LOG_SPANS) {
            self.span_events = is_truthy(&span_events);
        }

        self
    }

    /// Apply `-v`/`-q` counts from the command line.
    ///
    /// `quiet` wins over `verbose`; zero verbosity keeps the current level.
    pub fn with_verbosity(mut self, verbose: u8, quiet: bool) -> Self {
        self.level = match (quiet, verbose) {
            (true, _) => LogLevel::Error,
            (false, 0) => self.level,
            (false, 1) => LogLevel::Info,
            (false, 2) => LogLevel::Debug,
            (false, _) => LogLevel::Trace,
        };
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Initialize logging with the given configuration.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::new(config.level.as_str());

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(&config, io::stderr, config.ansi)];

    if let Some(file_path) = &config.file_path {
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        layers.push(fmt_layer(&config, Mutex::new(file), false));
    }

    tracing_subscriber::registry()
        .with(layers.with_filter(filter))
        .try_init()
        .map_err(|e| LogError::InitError(e.to_string()))
}

fn fmt_layer<W>(config: &LogConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(config.span_events());

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_log_level_parse() {
        let cases = vec![
            ("info", Some(LogLevel::Info)),
            ("DEBUG", Some(LogLevel::Debug)),
            ("Warning", Some(LogLevel::Warn)),
            ("warn", Some(LogLevel::Warn)),
            (" error ", Some(LogLevel::Error)),
            ("trace", Some(LogLevel::Trace)),
            ("invalid", None),
            ("cxs_ledger=debug", None),
        ];
        for (raw, expected) in cases {
            assert_eq!(LogLevel::parse(raw), expected, "{raw}");
        }
    }

    #[test]
    fn test_log_level_from() {
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::INFO);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.file_path.is_none());
        assert!(!config.source_location);
        assert!(!config.span_events);
        assert!(config.ansi);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = LogConfig::default().merge_env(lookup(&[
            ("CXS_LOG_LEVEL", "debug"),
            ("CXS_LOG_FORMAT", "json"),
            ("CXS_LOG_FILE", "/tmp/cxs.log"),
            ("CXS_LOG_SOURCE", "true"),
            ("CXS_LOG_SPANS", "1"),
        ]));

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/cxs.log")));
        assert!(config.source_location);
        assert!(config.span_events);
    }

    #[test]
    fn test_rust_log_fallback() {
        let config = LogConfig::default().merge_env(lookup(&[("RUST_LOG", "info")]));
        assert_eq!(config.level, LogLevel::Info);

        let config = LogConfig::default().merge_env(lookup(&[
            ("RUST_LOG", "info"),
            ("CXS_LOG_LEVEL", "error"),
        ]));
        assert_eq!(config.level, LogLevel::Error);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = LogConfig::default().merge_env(lookup(&[
            ("CXS_LOG_LEVEL", "loud"),
            ("CXS_LOG_FORMAT", "xml"),
            ("CXS_LOG_FILE", ""),
        ]));
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.file_path.is_none());
    }

    #[test]
    fn test_verbosity_flags() {
        let cases = vec![
            (0, false, LogLevel::Warn),
            (1, false, LogLevel::Info),
            (2, false, LogLevel::Debug),
            (5, false, LogLevel::Trace),
            (0, true, LogLevel::Error),
            (3, true, LogLevel::Error),
        ];
        for (verbose, quiet, expected) in cases {
            let config = LogConfig::default().with_verbosity(verbose, quiet);
            assert_eq!(config.level, expected, "-v x{verbose}, quiet={quiet}");
        }
    }

    #[test]
    fn test_init_with_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("cxs.log");
        let config = LogConfig {
            file_path: Some(path.clone()),
            ansi: false,
            ..LogConfig::default()
        };

        // Only one subscriber may be installed per process.
        assert!(init(config.clone()).is_ok());
        assert!(path.exists());
        assert!(matches!(init(config), Err(LogError::InitError(_))));
    }
}
