use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn sheetport(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sheetport").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("SHEETPORT_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// One "Oct" sheet: a good row and a row with no name.
fn write_workbook(dir: &Path) -> PathBuf {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Oct").unwrap();
    for (col, header) in ["name", "amount", "date", "verified"].iter().enumerate() {
        ws.write_string(0, col as u16, *header).unwrap();
    }
    ws.write_string(1, 0, "Asha").unwrap();
    ws.write_number(1, 1, 250.0).unwrap();
    ws.write_string(1, 2, today()).unwrap();
    ws.write_string(1, 3, "Yes").unwrap();
    ws.write_number(2, 1, 10.0).unwrap();
    ws.write_string(2, 2, today()).unwrap();

    let path = dir.join("upload.xlsx");
    wb.save(&path).unwrap();
    path
}

#[test]
fn check_reports_validation_errors() {
    let home = TempDir::new().unwrap();
    let file = write_workbook(home.path());
    sheetport(home.path())
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Oct"))
        .stdout(predicate::str::contains("Validation errors (1)"))
        .stdout(predicate::str::contains("Name is required"));
}

#[test]
fn check_rejects_oversized_upload() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("big.xlsx");
    std::fs::write(&file, vec![0u8; 2 * 1024 * 1024 + 1]).unwrap();
    sheetport(home.path())
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: File size exceeds 2MB limit"));
}

#[test]
fn check_rejects_other_file_types() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("data.csv");
    std::fs::write(&file, "name,amount\n").unwrap();
    sheetport(home.path())
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("only .xlsx files are accepted"));
}

#[test]
fn import_unknown_sheet_fails() {
    let home = TempDir::new().unwrap();
    let file = write_workbook(home.path());
    sheetport(home.path())
        .args(["import", "--sheet", "Dec"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sheet: Dec"));
}

#[test]
fn import_reports_unreachable_server() {
    let home = TempDir::new().unwrap();
    let file = write_workbook(home.path());
    sheetport(home.path())
        .args(["--api-url", "http://127.0.0.1:1", "import"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Import failed"));
}

#[test]
fn config_saves_and_shows_settings() {
    let home = TempDir::new().unwrap();
    sheetport(home.path())
        .args(["--api-url", "http://10.0.0.5:8080", "config", "--bind", "0.0.0.0:8080"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    let saved = home.path().join(".config/sheetport/settings.json");
    assert!(saved.exists());

    sheetport(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://10.0.0.5:8080"))
        .stdout(predicate::str::contains("0.0.0.0:8080"));
}

#[test]
fn env_overrides_saved_api_url() {
    let home = TempDir::new().unwrap();
    sheetport(home.path())
        .env("SHEETPORT_API_URL", "http://from-env:9000")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-env:9000"));
}
