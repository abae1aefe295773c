//! Environment variable handling.

use std::path::Path;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Workspace
    pub const CXS_ROOT: &str = "CXS_ROOT";
    pub const CXS_CONFIG: &str = "CXS_CONFIG";
    pub const CXS_LEDGER: &str = "CXS_LEDGER";

    // Logging
    pub const CXS_LOG_LEVEL: &str = "CXS_LOG_LEVEL";
    pub const CXS_LOG_FORMAT: &str = "CXS_LOG_FORMAT";
    pub const CXS_LOG_FILE: &str = "CXS_LOG_FILE";
    pub const CXS_LOG_SOURCE: &str = "CXS_LOG_SOURCE";
    pub const CXS_LOG_SPANS: &str = "CXS_LOG_SPANS";

    // Development
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const NO_COLOR: &str = "NO_COLOR";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env.local` and `.env` from the workspace root.
    ///
    /// Variables already set in the process win over both files, and
    /// `.env.local` wins over `.env`. Missing files are skipped.
    pub fn init(root: impl AsRef<Path>) -> Result<Self, EnvError> {
        let root = root.as_ref();
        for name in [".env.local", ".env"] {
            let path = root.join(name);
            if path.is_file() {
                dotenvy::from_path(&path)?;
            }
        }

        Ok(Self { _guard: () })
    }
}
