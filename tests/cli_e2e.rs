//! End-to-end tests for the seedwatch binary.
//!
//! Startup failures must abort with a non-zero exit and a clear message
//! before the poll loop starts. A successful startup would poll forever, so
//! only failure paths and --help are exercised here.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn seedwatch() -> Command {
    Command::cargo_bin("seedwatch").expect("binary should exist")
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(content.as_bytes()).expect("write file");
    path
}

#[test]
fn test_help_prints_usage() {
    seedwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch-list"));
}

#[test]
fn test_missing_config_file_exits_nonzero() {
    let dir = tempfile::TempDir::new().unwrap();
    seedwatch()
        .current_dir(dir.path())
        .args(["--config", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}

#[test]
fn test_malformed_config_exits_nonzero() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_file(&dir, "config.json", "{not json");
    seedwatch()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn test_missing_watch_list_exits_nonzero() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "config.json",
        r#"{
            "site_host": "https://tracker.example.org",
            "listing_page": "/list?page={page}",
            "login_probe": "takelogin",
            "entry_pattern": "(?P<title>a)(?P<downurl>b)",
            "watch_list_file": "no-such-watchlist.txt"
        }"#,
    );
    seedwatch()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-watchlist.txt"));
}

#[test]
fn test_invalid_entry_pattern_exits_nonzero() {
    let dir = tempfile::TempDir::new().unwrap();
    // Pattern compiles but lacks the required named groups.
    let config = write_file(
        &dir,
        "config.json",
        r#"{
            "site_host": "https://tracker.example.org",
            "listing_page": "/list?page={page}",
            "login_probe": "takelogin",
            "entry_pattern": "<b>([^<]+)</b>",
            "watch_list_file": "watchlist.txt"
        }"#,
    );
    write_file(&dir, "watchlist.txt", "Alpha\n");
    seedwatch()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pattern"));
}
