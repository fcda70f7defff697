//! End-to-end runs of the binary against a throwaway data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn homefinance(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("homefinance").unwrap();
    cmd.env("HOME", home.path())
        .env("HOMEFINANCE_DATA_DIR", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    homefinance(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized homefinance"));
    home
}

#[test]
fn test_commands_require_init() {
    let home = tempfile::tempdir().unwrap();
    homefinance(&home)
        .args(["categories", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run `homefinance init` first"));
}

#[test]
fn test_init_twice_keeps_database() {
    let home = initialized();
    homefinance(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already set up"));
}

#[test]
fn test_default_categories_listed() {
    let home = initialized();
    homefinance(&home)
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Housing").and(predicate::str::contains("Miscellaneous")));
}

#[test]
fn test_duplicate_category_rejected() {
    let home = initialized();
    homefinance(&home)
        .args(["categories", "add", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Food"));
}

#[test]
fn test_expense_add_and_list() {
    let home = initialized();
    homefinance(&home)
        .args([
            "expenses", "add", "Water bill", "--amount", "1,045.10", "--date", "2024-05-01",
            "--category", "Utilities",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added expense 1"));

    homefinance(&home)
        .args(["expenses", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Water bill").and(predicate::str::contains("1,045.10")));

    homefinance(&home)
        .args(["deposits", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No deposit entries."));
}

#[test]
fn test_invalid_entry_reports_all_errors() {
    let home = initialized();
    homefinance(&home)
        .args(["deposits", "add", "Paycheck", "--amount", "lots", "--date", "someday"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Invalid date")
                .and(predicate::str::contains("Invalid amount")),
        );
}

#[test]
fn test_budget_report_and_balance() {
    let home = initialized();
    homefinance(&home)
        .args(["budgets", "set", "Food", "400"])
        .assert()
        .success();
    homefinance(&home)
        .args(["expenses", "add", "Groceries", "--amount", "100", "--date", "2024-03-02", "--category", "Food", "--paid"])
        .assert()
        .success();
    homefinance(&home)
        .args(["deposits", "add", "Paycheck", "--amount", "2,500", "--date", "2024-03-01", "--paid"])
        .assert()
        .success();

    homefinance(&home)
        .args(["report", "budget", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03").and(predicate::str::contains("25.0%")));

    homefinance(&home)
        .args(["report", "balance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$2,400.00"));
}

#[test]
fn test_pay_wrong_type_not_found() {
    let home = initialized();
    homefinance(&home)
        .args(["expenses", "add", "Rent", "--amount", "900"])
        .assert()
        .success();
    homefinance(&home)
        .args(["deposits", "pay", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_backup_writes_file() {
    let home = initialized();
    let dest = home.path().join("copy.db");
    homefinance(&home)
        .args(["backup", "--output"])
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup saved"));
    assert!(dest.exists());
}
