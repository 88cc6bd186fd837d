//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary config and state
//! directory and verify outputs.

use indoc::formatdoc;
use std::path::{Path, PathBuf};
use std::process::Command;

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let sandbox = Self {
            dir: tempfile::tempdir().expect("tempdir"),
        };
        std::fs::create_dir_all(sandbox.state_dir()).expect("state dir");
        let config = formatdoc! {r#"
            timezone = "America/Chicago"

            [state]
            dir = "{state}"
        "#, state = sandbox.state_dir().display()};
        std::fs::write(sandbox.config_path(), config).expect("write config");
        sandbox
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    fn home(&self) -> &Path {
        self.dir.path()
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_zmanim"))
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .env("HOME", self.home())
            .env("RUST_LOG", "error")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }
}

#[test]
fn test_config_get_reads_file() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["config", "get", "timezone"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "America/Chicago");

    let (stdout, _, _) = sandbox.run(&["config", "get", "sabbath.trail_minutes"]);
    assert_eq!(stdout.trim(), "72");
}

#[test]
fn test_config_set_persists() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["config", "set", "offsets.chatzot", "10"]);
    assert_eq!(code, 0, "config set failed");
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = sandbox.run(&["config", "get", "offsets.chatzot"]);
    assert_eq!(stdout.trim(), "10");
}

#[test]
fn test_config_set_rejects_unknown_label() {
    let sandbox = Sandbox::new();
    let (_, stderr, code) = sandbox.run(&["config", "set", "fallback_label", "noon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_path_and_check() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["config", "path"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), sandbox.config_path().display().to_string());

    let (stdout, _, code) = sandbox.run(&["config", "check"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok: America/Chicago refresh at 02:00, fallback tzeit72min");
}

#[test]
fn test_config_show_is_json() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["config", "show"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("config show JSON");
    assert_eq!(parsed["refresh_time"], "02:00");
    assert_eq!(parsed["offsets"]["minchaGedola"], 25);
}

#[test]
fn test_read_label_record() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.state_dir().join("sunset.json"),
        r#"{"label":"sunset","relevant":true,"at":"2026-10-14T18:23:00-05:00","display":"Sunset 6:23 PM"}"#,
    )
    .unwrap();

    let (stdout, _, code) = sandbox.run(&["read", "sunset"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Sunset 6:23 PM (relevant)");

    let (stdout, _, code) = sandbox.run(&["read", "sunset", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["relevant"], true);
}

#[test]
fn test_read_unknown_or_missing_label_fails() {
    let sandbox = Sandbox::new();
    let (_, stderr, code) = sandbox.run(&["read", "noon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown zman label"));

    let (_, stderr, code) = sandbox.run(&["read", "dawn"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no record for 'dawn'"));
}

#[test]
fn test_state_without_records() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["state"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("No state written yet"));
}
