use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SHEET: &str = "\
Date,Module,Priority,Price,Notes
Jan,Food,High,100,groceries
Jan,Food,High,oops,
Feb,Rent,Low,500,landlord
";

fn write_sheet(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("expenses.csv");
    std::fs::write(&path, content).unwrap();
    path
}

/// Command with HOME pointed at a scratch directory so settings stay isolated.
fn expdash(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("expdash").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn summary_totals_full_selection() {
    let home = TempDir::new().unwrap();
    let sheet = write_sheet(home.path(), SHEET);
    expdash(&home)
        .args(["--file", sheet.to_str().unwrap(), "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filtered rows: 2 of 3"))
        .stdout(predicate::str::contains("Total expense: 600.00"))
        .stdout(predicate::str::contains("Rent"))
        .stdout(predicate::str::contains("500.00"));
}

#[test]
fn summary_price_range_excludes_cheaper_rows() {
    let home = TempDir::new().unwrap();
    let sheet = write_sheet(home.path(), SHEET);
    expdash(&home)
        .args(["--file", sheet.to_str().unwrap(), "summary", "--min", "200", "--max", "600", "--rows"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filtered rows: 1 of 3"))
        .stdout(predicate::str::contains("landlord"))
        .stdout(predicate::str::contains("groceries").not());
}

#[test]
fn summary_rejects_inverted_range() {
    let home = TempDir::new().unwrap();
    let sheet = write_sheet(home.path(), SHEET);
    expdash(&home)
        .args(["--file", sheet.to_str().unwrap(), "summary", "--min", "600", "--max", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid price range"));
}

#[test]
fn missing_file_is_reported() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("nope.xlsx");
    expdash(&home)
        .args(["--file", missing.to_str().unwrap(), "summary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn missing_column_is_reported() {
    let home = TempDir::new().unwrap();
    let sheet = write_sheet(home.path(), "Date,Module,Priority\nJan,Food,High\n");
    expdash(&home)
        .args(["--file", sheet.to_str().unwrap(), "columns"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing column: Price"));
}

#[test]
fn no_source_configured() {
    let home = TempDir::new().unwrap();
    expdash(&home)
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No source file"));
}

#[test]
fn columns_counts_bad_prices() {
    let home = TempDir::new().unwrap();
    let sheet = write_sheet(home.path(), SHEET);
    expdash(&home)
        .args(["--file", sheet.to_str().unwrap(), "columns"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Columns:      Date, Module, Priority, Price, Notes"))
        .stdout(predicate::str::contains("Bad prices:   1"));
}

#[test]
fn config_set_file_is_used_by_later_runs() {
    let home = TempDir::new().unwrap();
    let sheet = write_sheet(home.path(), SHEET);
    expdash(&home)
        .args(["config", "set-file", sheet.to_str().unwrap()])
        .assert()
        .success();
    expdash(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expenses.csv"));
    expdash(&home)
        .args(["summary", "--module", "Rent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filtered rows: 1 of 3"));
}

#[cfg(feature = "pdf")]
#[test]
fn export_writes_pdf() {
    let home = TempDir::new().unwrap();
    let sheet = write_sheet(home.path(), SHEET);
    let out = home.path().join("reports");
    std::fs::create_dir_all(&out).unwrap();
    expdash(&home)
        .args([
            "--file",
            sheet.to_str().unwrap(),
            "export",
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("expense_report.pdf"));
    let bytes = std::fs::read(out.join("expense_report.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    expdash(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expdash"));
}
