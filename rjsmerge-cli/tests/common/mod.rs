//! Common test utilities for CLI integration tests.
//!
//! Provides an isolated temporary directory for fragment files and a
//! command builder for the `rjsmerge` binary.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with an isolated working directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Command builder for the binary with the log mode variable cleared.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("rjsmerge").expect("Failed to find rjsmerge binary");
        cmd.current_dir(&self.temp_path)
            .env_remove("RJSMERGE_LOG_MODE")
            .env_remove("RJSMERGE_STRICT")
            .env_remove("RJSMERGE_STRIP_REMOTE_PATHS")
            .env_remove("RJSMERGE_OUTPUT_FORMAT");
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file under the environment and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write a JSON fragment file.
    pub fn write_fragment(&self, name: &str, payload: &serde_json::Value) -> PathBuf {
        self.write(name, &payload.to_string())
    }
}

/// Path to the merged build-file fixture shared with the library tests.
#[allow(dead_code)]
pub fn example_build_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("rjsmerge")
        .join("tests")
        .join("fixtures")
        .join("example-build.js")
}

/// The fixture text, byte for byte.
#[allow(dead_code)]
pub fn example_build_text() -> String {
    std::fs::read_to_string(example_build_path()).expect("Failed to read fixture")
}
