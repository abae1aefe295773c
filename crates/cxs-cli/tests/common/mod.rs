//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

pub const HEADER: &str =
    "timestamp,session_id,cycle_id,contract_ref,agent_id,tokens_or_runtime,status,notes\n";

/// Test workspace in a temporary directory
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Write `.cxs/config.yaml`
    pub fn with_config(self, config: &str) -> Self {
        self.write(".cxs/config.yaml", config);
        self
    }

    /// Set the current cycle
    pub fn with_cycle(self, cycle_id: &str) -> Self {
        self.write("cycles/current", &format!("{cycle_id}\n"));
        self
    }

    /// Write the default ledger verbatim
    pub fn with_ledger(self, contents: &str) -> Self {
        self.write("ledger/runs.csv", contents);
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.path().join("ledger").join("runs.csv")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).expect("Failed to read file")
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create dirs");
        }
        fs::write(path, contents).expect("Failed to write file");
    }

    /// Create a command rooted at this workspace
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("cxs").expect("Binary not found");
        cmd.current_dir(self.path())
            .env("CXS_ROOT", self.path())
            .env("NO_COLOR", "1")
            .env_remove("CXS_CONFIG")
            .env_remove("CXS_LEDGER")
            .env_remove("CXS_LOG_LEVEL")
            .env_remove("CXS_LOG_FILE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// A `log-run` invocation with every required flag set
    pub fn log_run(&self, session: &str, status: &str) -> Command {
        let mut cmd = self.command();
        cmd.args([
            "log-run",
            "--session",
            session,
            "--contract",
            "process.contract",
            "--agent",
            "agent-x",
            "--status",
            status,
        ]);
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON output helpers
pub mod json {
    use serde_json::Value;

    pub fn parse_output(output: &[u8]) -> Value {
        serde_json::from_slice(output).expect("Failed to parse JSON output")
    }

    pub fn assert_error(output: &[u8], code: &str) {
        let json = parse_output(output);
        assert_eq!(
            json.get("error")
                .and_then(|e| e.get("code"))
                .and_then(|c| c.as_str()),
            Some(code),
            "Expected error code: {code}"
        );
    }
}
