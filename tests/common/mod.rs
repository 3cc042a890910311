//! Shared integration-test harness for running the `clearsight` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncWriteExt;

/// Longest an interactive session may take before the test fails.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(20);

/// Helpers for invoking the `clearsight` binary.
pub struct ClearsightProcess;

impl ClearsightProcess {
    /// Runs a command to completion with stdin closed.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_clearsight"))
            .args(args)
            .env_remove("CLEARSIGHT_STUDY")
            .env_remove("CLEARSIGHT_ANALYZER")
            .env_remove("CLEARSIGHT_OUTPUT_DIR")
            .env_remove("GEMINI_API_KEY")
            .stdin(Stdio::null())
            .output()
            .expect("failed to run clearsight")
    }

    /// Runs a command feeding `input` to its stdin, then closing it.
    #[allow(clippy::missing_panics_doc)]
    pub async fn spawn_interactive(args: &[&str], input: &str) -> Output {
        let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_clearsight"))
            .args(args)
            .env_remove("CLEARSIGHT_STUDY")
            .env_remove("CLEARSIGHT_ANALYZER")
            .env_remove("CLEARSIGHT_OUTPUT_DIR")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn clearsight");

        let mut stdin = child.stdin.take().expect("stdin not captured");
        stdin
            .write_all(input.as_bytes())
            .await
            .expect("failed to write stdin");
        drop(stdin);

        tokio::time::timeout(SESSION_TIMEOUT, child.wait_with_output())
            .await
            .expect("session timed out")
            .expect("failed to wait for clearsight")
    }

    /// Reads the single export written into `dir`.
    #[allow(clippy::missing_panics_doc)]
    pub fn read_export(dir: &Path) -> (PathBuf, Value) {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .expect("output dir readable")
            .map(|entry| entry.expect("dir entry").path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        assert_eq!(files.len(), 1, "expected exactly one export in {dir:?}");
        let path = files.remove(0);
        let text = std::fs::read_to_string(&path).expect("export readable");
        let value = serde_json::from_str(&text).expect("export is valid JSON");
        (path, value)
    }

    /// Returns the path to a test fixture.
    #[must_use]
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}
