//! # CLI Tests
//!
//! Runs the built binary against a settings file in a temporary directory.

use std::path::Path;
use std::process::{Command, Output};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn xlbarcode(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("settings.json");
    let output = Command::new(env!("CARGO_BIN_EXE_xlbarcode"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "xlbarcode {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn test_logs_stay_off_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let output = xlbarcode(dir.path(), &["settings", "show"]);

    assert!(stderr(&output).contains("no settings file, writing defaults"));

    let out = stdout(&output);
    assert!(!out.contains("writing defaults"));
    let json: String = out.lines().filter(|l| !l.starts_with('#')).collect();
    let shown: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(shown["symbology"], "ean8");
}

#[test]
fn test_settings_set_accepts_shown_symbology() {
    let dir = tempfile::tempdir().unwrap();
    xlbarcode(dir.path(), &["settings", "set", "symbology", "upc_a"]);

    let out = stdout(&xlbarcode(dir.path(), &["settings", "show"]));
    assert!(out.contains("\"symbology\": \"upca\""));

    xlbarcode(dir.path(), &["settings", "set", "symbology", "upca"]);
    assert!(dir.path().join("settings.json").exists());
}
