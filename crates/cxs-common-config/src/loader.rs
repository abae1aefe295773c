//! Configuration file loading and parsing.

use crate::env::vars;
use crate::types::{CxsConfig, LOG_FORMATS, LOG_LEVELS};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding CXS configuration inside a workspace.
pub const CONFIG_DIR: &str = ".cxs";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

const ENV_REFERENCE: &str = r"\$\{([^}:]+)(?::-([^}]*))?\}";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given workspace root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            base_path: root.as_ref().to_path_buf(),
        }
    }

    /// Path of `.cxs/config.yaml` under the workspace root.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load `.cxs/config.yaml`, falling back to defaults when it is absent.
    pub fn load(&self) -> Result<CxsConfig, ConfigError> {
        let config_path = self.config_path();

        let config = if config_path.exists() {
            self.parse_file(&config_path)?
        } else {
            CxsConfig::default()
        };

        self.finish(config)
    }

    /// Load an explicit config file. The file must exist.
    pub fn load_from(&self, path: impl AsRef<Path>) -> Result<CxsConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let config = self.parse_file(path)?;
        self.finish(config)
    }

    fn parse_file(&self, path: &Path) -> Result<CxsConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    fn finish(&self, config: CxsConfig) -> Result<CxsConfig, ConfigError> {
        let config = apply_overrides(config, |var| std::env::var(var).ok());
        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(ENV_REFERENCE).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        let mut result = String::with_capacity(content.len());
        let mut last = 0;

        for cap in re.captures_iter(content) {
            let Some(full_match) = cap.get(0) else {
                continue;
            };
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result.push_str(&content[last..full_match.start()]);
            result.push_str(&value);
            last = full_match.end();
        }

        result.push_str(&content[last..]);
        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &CxsConfig) -> Result<(), ConfigError> {
        let paths = [
            ("ledger.path", &config.ledger.path),
            ("cycles.current_file", &config.cycles.current_file),
            ("cycles.changelog", &config.cycles.changelog),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("{key} must not be empty"),
                });
            }
        }

        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "logging.level must be one of: {}",
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "logging.format must be one of: {}",
                    LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Apply environment overrides on top of file values.
fn apply_overrides<F>(mut config: CxsConfig, lookup: F) -> CxsConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(ledger) = lookup(vars::CXS_LEDGER).filter(|v| !v.is_empty()) {
        config.ledger.path = PathBuf::from(ledger);
    }
    config
}
