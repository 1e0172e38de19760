//! CLI integration tests.
//!
//! Every test runs `bt` against a database in a temp directory. Stdout is a
//! pipe here, so commands answer in JSON and errors arrive on stderr as
//! structured JSON.
//!
//! ## Exit Codes
//! - 0: success
//! - 4: validation (unknown species, clear without `--yes`)
//! - 6: import conflict

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use tempfile::TempDir;

fn bt(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("bt").unwrap();
    cmd.current_dir(dir)
        .env_remove("BT_DB")
        .env_remove("BT_TEST_DB")
        .env_remove("BIRD_TRACKER_DB")
        .env_remove("BT_BACKUP_DIR")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(dir.join("ids.db"));
    cmd
}

fn stdout_json(output: &std::process::Output) -> JsonValue {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn stderr_json(output: &std::process::Output) -> JsonValue {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .expect("stderr should carry a JSON error");
    serde_json::from_str(line).expect("valid JSON error")
}

#[test]
fn add_then_list() {
    let dir = TempDir::new().unwrap();

    let output = bt(dir.path()).args(["add", "12", "Brown goshawk"]).output().unwrap();
    assert!(output.status.success());
    let added = stdout_json(&output);
    assert_eq!(added["track_id"], 12);
    assert_eq!(added["identification_id"], 2);

    bt(dir.path()).args(["add", "7", "69"]).assert().success();

    let output = bt(dir.path()).arg("list").output().unwrap();
    let listed = stdout_json(&output);
    let entries = listed.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["identification_name"], "Galah");
}

#[test]
fn unknown_species_is_validation_error() {
    let dir = TempDir::new().unwrap();

    let output = bt(dir.path()).args(["add", "3", "Brown goshawc"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));

    let error = stderr_json(&output);
    assert_eq!(error["error"]["code"], "UNKNOWN_SPECIES");
    assert!(error["error"]["hint"].as_str().unwrap().contains("Brown goshawk"));
}

#[test]
fn import_conflict_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    bt(dir.path()).args(["add", "5", "2"]).assert().success();

    let csv = dir.path().join("incoming.csv");
    fs::write(
        &csv,
        "track_id,identification_id,identification_at\n5,3,\n9,1,2024-01-01T00:00:00.000Z\n",
    )
    .unwrap();

    let output = bt(dir.path()).arg("import").arg(&csv).output().unwrap();
    assert_eq!(output.status.code(), Some(6));
    let error = stderr_json(&output);
    assert_eq!(error["error"]["code"], "IMPORT_CONFLICT");
    assert_eq!(error["error"]["conflicts"].as_array().unwrap().len(), 1);

    let output = bt(dir.path()).args(["show", "9"]).output().unwrap();
    assert!(stdout_json(&output)["identification"].is_null());
}

#[test]
fn import_merges_rows() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("incoming.csv");
    fs::write(
        &csv,
        "identification_at,track_id,identification_id\n2024-01-01T00:00:00.000Z,4,10\n,x,1\n",
    )
    .unwrap();

    let output = bt(dir.path()).arg("import").arg(&csv).output().unwrap();
    assert!(output.status.success());
    let stats = &stdout_json(&output)["stats"];
    assert_eq!(stats["dropped"], 1);
    assert_eq!(stats["merge"]["created"], 1);

    let output = bt(dir.path()).args(["show", "4"]).output().unwrap();
    assert_eq!(stdout_json(&output)["identification_id"], 10);
}

#[test]
fn export_writes_csv() {
    let dir = TempDir::new().unwrap();
    bt(dir.path()).args(["add", "12", "2"]).assert().success();

    let target = dir.path().join("out.csv");
    bt(dir.path()).arg("export").arg("--output").arg(&target).assert().success();

    let content = fs::read_to_string(&target).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("track_id,identification_id,identification_name,identification_at")
    );
    assert!(lines.next().unwrap().starts_with("12,2,Brown goshawk,"));
}

#[test]
fn clear_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    bt(dir.path()).args(["add", "1", "1"]).assert().success();

    let output = bt(dir.path()).arg("clear").output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stderr_json(&output)["error"]["code"], "CLEAR_NOT_CONFIRMED");

    let backups = dir.path().join("backups");
    bt(dir.path())
        .arg("--backup-dir")
        .arg(&backups)
        .args(["clear", "--yes"])
        .assert()
        .success();

    let written: Vec<_> = fs::read_dir(&backups).unwrap().collect();
    assert_eq!(written.len(), 1);

    let output = bt(dir.path()).arg("list").output().unwrap();
    assert!(stdout_json(&output).as_array().unwrap().is_empty());
}

#[test]
fn species_table_has_every_label() {
    let dir = TempDir::new().unwrap();
    let output = bt(dir.path()).arg("species").output().unwrap();
    let table = stdout_json(&output);
    let table = table.as_array().unwrap();
    assert_eq!(table.len(), 74);
    assert_eq!(table[0]["label"], "Unknown");
}
