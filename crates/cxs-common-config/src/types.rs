//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log formats accepted in `logging.format`.
pub const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Root configuration, stored in `.cxs/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CxsConfig {
    /// Run ledger settings.
    pub ledger: LedgerConfig,
    /// Cycle tracking settings.
    pub cycles: CycleConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl CxsConfig {
    /// Resolve every configured path against `root`.
    ///
    /// Absolute paths are kept as they are.
    pub fn resolve(&self, root: impl AsRef<Path>) -> WorkspacePaths {
        let root = root.as_ref();
        let join = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        };

        WorkspacePaths {
            root: root.to_path_buf(),
            ledger: join(&self.ledger.path),
            current_cycle: join(&self.cycles.current_file),
            changelog: join(&self.cycles.changelog),
        }
    }
}

/// Run ledger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ledger CSV file, relative to the workspace root.
    pub path: PathBuf,
    /// Take an exclusive file lock while appending.
    pub lock: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ledger/runs.csv"),
            lock: false,
        }
    }
}

/// Cycle tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// File holding the current cycle id.
    pub current_file: PathBuf,
    /// Markdown timeline that `new-cycle --log-changelog` appends to.
    pub changelog: PathBuf,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            current_file: PathBuf::from("cycles/current"),
            changelog: PathBuf::from("ledger/CHANGELOG_TIMELINE.md"),
        }
    }
}

/// Logging defaults; environment variables and CLI flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Absolute locations of the files CXS touches in a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub ledger: PathBuf,
    pub current_cycle: PathBuf,
    pub changelog: PathBuf,
}
