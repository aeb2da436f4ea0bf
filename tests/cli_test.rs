//! Integration tests for the termdown CLI

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's config files and environment
fn termdown(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("termdown").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("TERMDOWN_CONFIG")
        .env_remove("TERMDOWN_WIDTH")
        .env_remove("TERMDOWN_COLOR")
        .env_remove("TERMDOWN_TABLE_OVERFLOW")
        .env_remove("TERMDOWN_TABLE_BORDER")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: termdown"))
        .stdout(predicate::str::contains("--tree-text"));
}

#[test]
fn version_flag_shows_version() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn renders_stdin_without_color_when_piped() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .write_stdin("# Hello\n\nsome *text*\n\n- a\n- b\n")
        .assert()
        .success()
        .stdout("Hello\n\nsome text\n\n• a\n• b\n");
}

#[test]
fn renders_file_argument() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("doc.md");
    std::fs::write(&path, "> quoted\n").unwrap();

    termdown(&home)
        .arg(&path)
        .assert()
        .success()
        .stdout("│ quoted\n");
}

#[test]
fn dash_reads_stdin() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("-")
        .write_stdin("plain")
        .assert()
        .success()
        .stdout("plain\n");
}

#[test]
fn draws_tables_with_requested_border() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .args(["--border", "ascii"])
        .write_stdin("| a | b |\n|---|---|\n| 1 | 2 |\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("| a | b |"))
        .stdout(predicate::str::contains("| 1 | 2 |"));
}

#[test]
fn no_tables_keeps_pipes_as_text() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("--no-tables")
        .write_stdin("| a | b |\n|---|---|\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("| a | b |"))
        .stdout(predicate::str::contains("+").not());
}

#[test]
fn raw_mode_passes_through() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("--raw")
        .write_stdin("**bold**\n")
        .assert()
        .success()
        .stdout("**bold**\n");
}

#[test]
fn tokens_mode_lists_tokens() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("--tokens")
        .write_stdin("# Title\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("heading_open"))
        .stdout(predicate::str::contains("heading_close"));
}

#[test]
fn tree_mode_prints_outline() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("--tree")
        .write_stdin("# Title\n\n> Quote")
        .assert()
        .success()
        .stdout("<root>\n  <h1>\n    <inline>\n  <blockquote>\n    <p>\n      <inline>\n");
}

#[test]
fn json_mode_is_valid_json() {
    let home = TempDir::new().unwrap();
    let output = termdown(&home)
        .arg("--json")
        .write_stdin("| X | Y |\n|:---:|---:|\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tables"][0]["alignments"][0], "center");
    assert_eq!(value["tables"][0]["alignments"][1], "right");
}

#[test]
fn mode_flags_conflict() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .args(["--json", "--tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn make_config_prints_template() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("--make-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[table]"))
        .stdout(predicate::str::contains("overflow = \"clip\""));
}

#[test]
fn local_config_is_picked_up() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("termdown.toml"),
        "[table]\nborder = \"ascii\"\n",
    )
    .unwrap();

    termdown(&home)
        .write_stdin("| a |\n|---|\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("+---+"));
}

#[test]
fn broken_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("broken.toml");
    std::fs::write(&path, "[table\n").unwrap();

    termdown(&home)
        .arg("--config")
        .arg(&path)
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn missing_file_fails() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .arg("does-not-exist.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read does-not-exist.md"));
}

#[test]
fn completions_are_generated() {
    let home = TempDir::new().unwrap();
    termdown(&home)
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("termdown"));
}
