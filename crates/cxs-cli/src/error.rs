//! CLI error handling and formatting.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use cxs_common_config::{ConfigError, EnvError};
use cxs_common_log::LogError;
use cxs_ledger::{LedgerError, ValidationError};
use thiserror::Error;

pub mod formatter;

pub use formatter::ErrorFormatter;

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        resource_type: String,
        resource_name: String,
        hint: Option<String>,
    },

    #[error("{message}")]
    User {
        message: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Validation { .. } => "E003",
            Self::NotFound { .. } => "E004",
            Self::User { .. } => "E005",
            Self::Other(_) => "E999",
        }
    }

    /// Raw process exit status for this error
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Validation { .. } => 5,
            Self::NotFound { .. } => 6,
            Self::User { .. } | Self::Other(_) => 1,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } | Self::NotFound { hint, .. } | Self::User { hint, .. } => {
                hint.as_deref()
            }
            _ => None,
        }
    }

    /// Create a config error with hint
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: Some(hint.into()),
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(
        message: impl Into<String>,
        source: io::Error,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source,
            path: Some(path.into()),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            expected: None,
            actual: None,
        }
    }

    /// Create a user error with hint
    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

// Conversion implementations
impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            path: None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::NotFound { .. } => "Pass an existing file to --config or unset CXS_CONFIG",
            ConfigError::EnvVarNotFound { .. } => "Export the variable or give it a ${VAR:-default}",
            _ => "Check .cxs/config.yaml in the workspace root",
        };
        Self::Config {
            message: format!("Configuration error: {err}"),
            source: Some(Box::new(err)),
            hint: Some(hint.to_string()),
        }
    }
}

impl From<EnvError> for CliError {
    fn from(err: EnvError) -> Self {
        Self::Config {
            message: format!("Environment error: {err}"),
            source: Some(Box::new(err)),
            hint: Some("Check the .env files in the workspace root".to_string()),
        }
    }
}

impl From<LogError> for CliError {
    fn from(err: LogError) -> Self {
        Self::Config {
            message: format!("Logging setup failed: {err}"),
            source: Some(Box::new(err)),
            hint: Some("Check CXS_LOG_FILE and the other CXS_LOG_* variables".to_string()),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        let (field, expected, actual) = match &err {
            ValidationError::SchemaMismatch { expected, actual } => (
                None,
                Some(format!("{expected} columns")),
                Some(format!("{actual} columns")),
            ),
            ValidationError::InvalidTimestamp { value } => (
                Some("timestamp".to_string()),
                Some("ISO 8601, e.g. 2025-01-15T10:30:00Z".to_string()),
                Some(value.clone()),
            ),
            ValidationError::InvalidStatus { value, allowed } => (
                Some("status".to_string()),
                Some(allowed.join(", ")),
                Some(value.clone()),
            ),
            ValidationError::MissingRequiredField { field } => {
                (Some(field.to_string()), Some("a non-empty value".to_string()), None)
            }
        };

        Self::Validation {
            message: format!("Invalid ledger row: {err}"),
            field,
            expected,
            actual,
        }
    }
}

impl From<LedgerError> for CliError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(err) => err.into(),
            LedgerError::HeaderMismatch(mismatch) => Self::Validation {
                message: "Ledger header does not match the run ledger schema".to_string(),
                field: Some("header".to_string()),
                expected: Some(mismatch.expected.join(",")),
                actual: Some(mismatch.found.join(",")),
            },
            LedgerError::FileNotFound { path } => Self::NotFound {
                message: format!("ledger not found: {}", path.display()),
                resource_type: "ledger".to_string(),
                resource_name: path.display().to_string(),
                hint: Some("Log a run first with 'cxs log-run'".to_string()),
            },
            LedgerError::Io { path, source } => Self::Io {
                message: format!("Ledger I/O failed: {source}"),
                source,
                path: Some(path),
            },
        }
    }
}
