//! Common test utilities for integration tests.
//!
//! Helpers for loading the build-file fixture and building fragments from
//! inline JSON.

use std::fs;
use std::path::{Path, PathBuf};

use rjsmerge::serialize::parse_build_file;
use rjsmerge::ConfigFragment;
use serde_json::Value;

/// Path to a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The merged build file shipped as a fixture, byte for byte.
#[allow(dead_code)]
pub fn example_build_text() -> String {
    fs::read_to_string(fixture_path("example-build.js")).unwrap()
}

/// The merged build file fixture as a JSON value.
#[allow(dead_code)]
pub fn example_build_value() -> Value {
    parse_build_file(&example_build_text()).unwrap()
}

/// Build a fragment from inline JSON, panicking on malformed payloads.
#[allow(dead_code)]
pub fn fragment(source_id: &str, precedence: i64, payload: Value) -> ConfigFragment {
    ConfigFragment::from_value(source_id, precedence, &payload).unwrap()
}

/// Write `contents` to `dir/name` and return the path.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
