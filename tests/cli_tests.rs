//! CLI integration tests

use std::path::Path;
use std::process::Command;

use predicates::prelude::*;

fn voice_notes_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_voice-notes"))
}

/// Binary isolated from the user's config and data
fn isolated(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("voice-notes").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("VOICE_NOTES_DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_output() {
    let output = voice_notes_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("voice notes"));
    assert!(stdout.contains("--max-duration"));
    assert!(stdout.contains("--data-dir"));
    assert!(stdout.contains("--notify"));
    assert!(stdout.contains("--no-notify"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("delete"));
}

#[test]
fn version_output() {
    let output = voice_notes_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("voice-notes"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_help() {
    let output = voice_notes_bin()
        .args(["config", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for action in ["init", "set", "get", "list", "path"] {
        assert!(stdout.contains(action), "missing {action} in {stdout}");
    }
}

#[test]
fn config_path_command() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("voice-notes").and(predicate::str::contains("config.toml")));
}

#[test]
fn config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["config", "set", "max_duration", "90s"])
        .assert()
        .success();

    isolated(home.path())
        .args(["config", "get", "max_duration"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1m30s"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["config", "set", "volume", "11"])
        .assert()
        .failure();
}

#[test]
fn list_on_empty_data_dir_shows_hint() {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("notes");
    isolated(home.path())
        .arg("list")
        .arg("--data-dir")
        .arg(&data)
        .assert()
        .success()
        .stderr(predicate::str::contains("No recordings yet"));
}

#[test]
fn delete_unknown_number_fails() {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("notes");
    isolated(home.path())
        .args(["delete", "1", "--data-dir"])
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No recording #1"));
}

#[test]
fn invalid_max_duration_error() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["--max-duration", "forever"])
        .write_stdin("quit\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid max-duration"));
}

#[test]
fn interactive_quit_exits_cleanly() {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("notes");
    isolated(home.path())
        .arg("--data-dir")
        .arg(&data)
        .write_stdin("help\nbogus\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("play, p <n>"))
        .stderr(predicate::str::contains("Unknown command"));
}

#[test]
fn interactive_exits_on_end_of_input() {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("notes");
    isolated(home.path())
        .arg("--data-dir")
        .arg(&data)
        .write_stdin("list\n")
        .assert()
        .success();
}
