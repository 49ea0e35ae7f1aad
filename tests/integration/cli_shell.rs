#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("book.bin");
    (dir, path)
}

fn phonedb(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("phonedb");
    cmd.env_remove("PHONEDB_DB")
        .env_remove("PHONEDB_LOG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("missing.toml"))
        .args(["--theme", "plain"]);
    cmd
}

fn shell(dir: &Path, script: &str) -> String {
    let output = phonedb(dir)
        .write_stdin(script.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("utf8 stdout")
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} missing from:\n{haystack}"))
}

#[test]
fn shell_session_lists_in_phone_order() {
    let (dir, db) = workspace();
    let script = format!(
        "use {}\nrestore\ninsert Alice 555-0100\ninsert Bob 555-0050\ninsert Cara 555-0100\nselect\nexit\n",
        db.display()
    );
    let out = shell(dir.path(), &script);

    assert!(out.contains(&format!("Database {} is loaded successfully", db.display())));
    assert!(out.starts_with("~> "));
    let bob = position(&out, "Bob");
    let alice = position(&out, "Alice");
    let cara = position(&out, "Cara");
    assert!(bob < alice && alice < cara, "unexpected order:\n{out}");
    assert!(out.contains("Showing 3 entries"));
}

#[test]
fn shell_reports_missing_and_uninitialized_databases() {
    let (dir, db) = workspace();
    let script = format!("select\nuse {}\nselect\ninsert Alice 1\n", db.display());
    let out = shell(dir.path(), &script);

    assert!(out.contains("No database is used. Execute 'use db.bin' to use a database"));
    assert_eq!(out.matches("Database is not initialized").count(), 2);
    assert_eq!(std::fs::metadata(&db).expect("created").len(), 0);
}

#[test]
fn shell_rejects_malformed_input() {
    let (dir, db) = workspace();
    let script = format!(
        "use {}\nrestore\ninsert Alice\ninsert a b c\nfrobnicate\ndelete 1\n\nselect\n",
        db.display()
    );
    let out = shell(dir.path(), &script);

    assert_eq!(out.matches("Incorrect command format").count(), 2);
    assert_eq!(out.matches("Command is not recognized").count(), 2);
    assert!(out.contains("Showing 0 entries"));
}

#[test]
fn shell_open_failure_keeps_running() {
    let (dir, _db) = workspace();
    let missing_parent = dir.path().join("no-such-dir").join("book.bin");
    let script = format!("use {}\nselect\n", missing_parent.display());
    let out = shell(dir.path(), &script);

    assert!(out.contains("Failed to open database file"));
    assert!(out.contains("No database is used"));
}

#[test]
fn one_shot_commands_share_the_file() {
    let (dir, db) = workspace();
    phonedb(dir.path()).arg("--db").arg(&db).arg("init").assert().success();
    for (name, phone) in [("Alice", "555-0100"), ("Bob", "555-0050"), ("Cara", "555-0100")] {
        phonedb(dir.path())
            .arg("--db")
            .arg(&db)
            .args(["insert", name, phone])
            .assert()
            .success();
    }

    let output = phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["--format", "json", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["declared"], 3);
    let names: Vec<&str> = json["records"]
        .as_array()
        .expect("records array")
        .iter()
        .map(|r| r["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["Bob", "Alice", "Cara"]);
    assert!(json["error"].is_null());

    let output = phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["--format", "json", "find", "555-0100"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let hits: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(hits.as_array().map(Vec::len), Some(2));
    assert_eq!(hits[0]["name"], "Alice");
    assert_eq!(hits[0]["position"], 1);
}

#[test]
fn insert_rejects_overlong_fields() {
    let (dir, db) = workspace();
    phonedb(dir.path()).arg("--db").arg(&db).arg("init").assert().success();
    phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["insert", &"x".repeat(64), "1"])
        .assert()
        .failure();
    assert_eq!(std::fs::metadata(&db).expect("db").len(), 2050);
}

#[test]
fn insert_rejects_blank_fields() {
    let (dir, db) = workspace();
    phonedb(dir.path()).arg("--db").arg(&db).arg("init").assert().success();
    for (name, phone) in [("", ""), ("Alice", ""), ("Ann Lee", "555-0100")] {
        phonedb(dir.path())
            .arg("--db")
            .arg(&db)
            .args(["insert", name, phone])
            .assert()
            .failure();
    }
    assert_eq!(std::fs::metadata(&db).expect("db").len(), 2050);

    let output = phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["--format", "json", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["declared"], 0);
}

#[test]
fn verify_exit_code_tracks_integrity() {
    let (dir, db) = workspace();
    phonedb(dir.path()).arg("--db").arg(&db).arg("init").assert().success();
    phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["insert", "Alice", "555-0100"])
        .assert()
        .success();

    let output = phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["--format", "json", "verify", "--level", "full"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["success"], true);

    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&db)
        .expect("open db");
    file.set_len(2050).expect("truncate records");
    phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .arg("verify")
        .assert()
        .code(2);
}

#[test]
fn stats_reports_capacity() {
    let (dir, db) = workspace();
    phonedb(dir.path()).arg("--db").arg(&db).arg("init").assert().success();
    let output = phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["--format", "json", "stats"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["capacity"], 1024);
    assert_eq!(json["free_slots"], 1024);
    assert_eq!(json["file_bytes"], 2050);
}

#[test]
fn commands_without_a_database_fail() {
    let (dir, _db) = workspace();
    phonedb(dir.path()).arg("list").assert().failure();
}

#[test]
fn search_probes_log_at_debug() {
    let (dir, db) = workspace();
    phonedb(dir.path()).arg("--db").arg(&db).arg("init").assert().success();
    phonedb(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["insert", "Alice", "555-0100"])
        .assert()
        .success();

    let stderr_at = |filter: &str, name: &str| {
        let output = phonedb(dir.path())
            .arg("--db")
            .arg(&db)
            .args(["--log-level", filter, "insert", name, "555-0050"])
            .assert()
            .success()
            .get_output()
            .stderr
            .clone();
        String::from_utf8(output).expect("utf8 stderr")
    };
    assert!(stderr_at("phonedb=debug", "Bob").contains("locator.probe"));
    assert!(!stderr_at("phonedb=info", "Cara").contains("locator.probe"));
}
