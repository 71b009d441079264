//! Test support utilities for cfgseal integration tests.
//!
//! Provides an isolated config directory and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated temp directory.
///
/// Child processes run with `.current_dir()` set to the temp dir and with
/// every `CFGSEAL_*` variable cleared, so tests can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// Empty directory, no sdk.json.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Directory with `sdk.json` holding `json`.
    pub fn with_config(json: &str) -> Self {
        let t = Self::new();
        t.write("sdk.json", json);
        t
    }

    /// Write a file into the test directory and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("sdk.json")
    }
}
