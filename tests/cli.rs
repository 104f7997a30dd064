//! End-to-end tests of the `dashsync` binary.

use assert_cmd::Command;
use dashsync::storage::schema::SCHEMA_SQL;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_db(dir: &Path, dashboards: &[(&str, &str, &str)]) -> PathBuf {
    let path = dir.join("grafana.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA_SQL).unwrap();
    for (title, slug, data) in dashboards {
        conn.execute(
            "INSERT INTO dashboard (title, slug, data) VALUES (?1, ?2, ?3)",
            [title, slug, data],
        )
        .unwrap();
    }
    path
}

fn dashsync() -> Command {
    let mut cmd = Command::cargo_bin("dashsync").unwrap();
    cmd.env_remove("DASHSYNC_UID_MODE")
        .env_remove("DASHSYNC_EXPORT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn stored_data(db: &Path, id: i64) -> (String, String, String) {
    let conn = Connection::open(db).unwrap();
    conn.query_row(
        "SELECT title, slug, data FROM dashboard WHERE id = ?1",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .unwrap()
}

fn backups(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("grafana.db."))
        })
        .collect()
}

#[test]
fn test_export_writes_one_file_per_dashboard() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(
        temp_dir.path(),
        &[
            ("CPU", "cpu", r#"{"uid":"abc","title":"CPU"}"#),
            ("Disk IO", "disk-io", r#"{"uid":"def","title":"Disk IO"}"#),
        ],
    );
    let out = temp_dir.path().join("out");

    dashsync()
        .arg(&db)
        .arg("--export-dir")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out.join("cpu.json")).unwrap(),
        "{\n  \"title\": \"CPU\",\n  \"uid\": \"abc\"\n}"
    );
    assert!(out.join("disk-io.json").exists());
    assert!(backups(temp_dir.path()).is_empty());
}

#[test]
fn test_export_defaults_to_sqlite_dir_in_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);

    dashsync()
        .current_dir(temp_dir.path())
        .arg(&db)
        .assert()
        .success();

    assert!(temp_dir.path().join("sqlite").join("cpu.json").exists());
}

#[test]
fn test_export_dir_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);
    let out = temp_dir.path().join("from-env");

    dashsync()
        .env("DASHSYNC_EXPORT_DIR", &out)
        .arg(&db)
        .assert()
        .success();

    assert!(out.join("cpu.json").exists());
}

#[test]
fn test_title_import_updates_and_backs_up() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);
    let original = fs::read(&db).unwrap();
    let input = temp_dir.path().join("cpu.json");
    fs::write(&input, r#"{"title":"CPU","uid":"abc","version":2}"#).unwrap();

    let output = dashsync().arg(&db).arg(&input).output().unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(
        stdout.contains("SQLite DB has 1 dashboards, there were 1 JSONs to import, imported 1"),
        "{stdout}"
    );

    let (_, _, data) = stored_data(&db, 1);
    assert!(data.contains("\"version\": 2"));
    assert!(temp_dir.path().join("cpu.json.was").exists());

    let backups = backups(temp_dir.path());
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read(&backups[0]).unwrap(), original);
}

#[test]
fn test_import_without_changes_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);
    let out = temp_dir.path().join("sqlite");

    dashsync().arg(&db).arg("--export-dir").arg(&out).assert().success();
    dashsync()
        .env("DASHSYNC_UID_MODE", "1")
        .arg(&db)
        .arg(out.join("cpu.json"))
        .assert()
        .success();

    assert!(backups(temp_dir.path()).is_empty());
    assert!(!out.join("cpu.json.was").exists());
}

#[test]
fn test_uid_import_renames_and_reslugs() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);
    let input = temp_dir.path().join("cpu.json");
    fs::write(&input, r#"{"title":"CPU load","uid":"abc","tags":["perf"]}"#).unwrap();

    let output = dashsync()
        .arg("--by-uid")
        .arg("--json")
        .arg(&db)
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["mode"], "uid");
    assert_eq!(report["summary"]["imported"], 1);

    let (title, slug, _) = stored_data(&db, 1);
    assert_eq!(title, "CPU load");
    assert_eq!(slug, "cpu-load");
}

#[test]
fn test_unknown_uid_fails_before_any_write() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);
    let input = temp_dir.path().join("other.json");
    fs::write(&input, r#"{"title":"Other","uid":"zzz"}"#).unwrap();

    dashsync()
        .arg("--by-uid")
        .arg(&db)
        .arg(&input)
        .assert()
        .failure()
        .code(3);

    assert!(backups(temp_dir.path()).is_empty());
}

#[test]
fn test_bad_item_arity_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);

    dashsync()
        .arg(&db)
        .arg("cpu.json;CPU")
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_missing_database_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();

    let output = dashsync()
        .arg("--json")
        .arg(temp_dir.path().join("missing.db"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));

    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["code"], "CONFIG_ERROR");
}

#[test]
fn test_database_argument_is_required() {
    dashsync().assert().failure();
}

#[test]
fn test_quiet_still_reports_fatal_errors() {
    let temp_dir = TempDir::new().unwrap();

    let output = dashsync()
        .arg("-q")
        .arg(temp_dir.path().join("missing.db"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("missing.db"), "{stderr}");
    assert!(!stderr.contains("Hint:"), "{stderr}");
}

#[test]
fn test_title_import_reports_snapshot_of_unchanged_item() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_db(temp_dir.path(), &[("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)]);
    let input = temp_dir.path().join("cpu.json");
    fs::write(&input, r#"{"uid":"abc","title":"CPU"}"#).unwrap();

    let output = dashsync()
        .arg("--no-color")
        .arg(&db)
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("unchanged"), "{stdout}");
    assert!(stdout.contains("previous JSON in"), "{stdout}");
    assert!(stdout.contains("cpu.json.was"), "{stdout}");
    assert!(stdout.contains("imported 0"), "{stdout}");
}
