//! Integration tests for the trove CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// A trove command isolated from the caller's environment
fn bare() -> Command {
    let mut cmd = Command::cargo_bin("trove").unwrap();
    cmd.env_remove("TROVE_DATA_DIR")
        .env_remove("TROVE_BACKEND")
        .env_remove("TROVE_LOAN_PERIOD_DAYS")
        .env_remove("TROVE_LOG");
    cmd
}

/// A trove command keeping its records in `data`
fn trove(data: &TempDir) -> Command {
    let mut cmd = bare();
    cmd.arg("--data-dir").arg(data.path());
    cmd
}

fn seeded_org() -> TempDir {
    let tmp = TempDir::new().unwrap();
    trove(&tmp).args(["org", "seed"]).assert().success();
    tmp
}

fn seeded_library() -> TempDir {
    let tmp = TempDir::new().unwrap();
    trove(&tmp).args(["lib", "seed"]).assert().success();
    tmp
}

fn json(cmd: &mut Command) -> Value {
    let output = cmd.arg("-f").arg("json").output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    bare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("org"))
        .stdout(predicate::str::contains("lib"));
}

#[test]
fn test_version_displays() {
    bare()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("trove"));
}

#[test]
fn test_completions_bash() {
    bare()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trove"));
}

// ============================================================================
// Workspace Tests
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    bare()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized trove workspace"));

    assert!(tmp.path().join(".trove/config.yaml").is_file());
    assert!(tmp.path().join(".trove/data").is_dir());
}

#[test]
fn test_init_twice_reports_existing_workspace() {
    let tmp = TempDir::new().unwrap();
    bare().current_dir(tmp.path()).arg("init").assert().success();
    bare()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_workspace_data_dir_is_discovered_from_subdirectory() {
    let tmp = TempDir::new().unwrap();
    bare().current_dir(tmp.path()).arg("init").assert().success();
    let nested = tmp.path().join("notes/2024");
    std::fs::create_dir_all(&nested).unwrap();

    bare()
        .current_dir(&nested)
        .args(["org", "seed"])
        .assert()
        .success();
    assert!(tmp.path().join(".trove/data/employees.txt").is_file());
}

// ============================================================================
// Organization Tests
// ============================================================================

#[test]
fn test_org_seed_statistics() {
    let tmp = seeded_org();
    let stats = json(trove(&tmp).args(["org", "stats"]));
    assert_eq!(stats["employees"], 22);
    assert_eq!(stats["managers"], 5);
    assert_eq!(stats["scientists"], 10);
    assert_eq!(stats["technicians"], 7);
    assert_eq!(stats["departments"], 5);
    assert_eq!(stats["projects"], 8);
    assert_eq!(stats["equipment"], 12);
}

#[test]
fn test_org_seed_refuses_second_run() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "seed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already holds records"));
}

#[test]
fn test_org_check_passes_after_seed() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent"));
}

#[test]
fn test_assign_equipment_to_technician() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "equip", "assign", "E010", "T007"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned E010 to T007"));

    let items = json(trove(&tmp).args(["org", "equip", "list", "--status", "in-use"]));
    let e010 = items
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "E010")
        .unwrap();
    assert_eq!(e010["status"], "IN_USE");
    assert_eq!(e010["assigned_to"], "T007");
}

#[test]
fn test_assign_equipment_to_scientist_is_refused() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "equip", "assign", "E010", "S001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a technician"));
}

#[test]
fn test_technician_holding_equipment_cannot_be_removed() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "emp", "remove", "T001"])
        .assert()
        .failure();
    trove(&tmp)
        .args(["-f", "id", "org", "emp", "list", "--role", "technician"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T001"));
}

#[test]
fn test_next_employee_id_per_role() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "emp", "next-id", "scientist"])
        .assert()
        .success()
        .stdout("S011\n");
    trove(&tmp)
        .args(["org", "emp", "next-id", "technician"])
        .assert()
        .success()
        .stdout("T008\n");
}

#[test]
fn test_add_scientist_gets_generated_id() {
    let tmp = seeded_org();
    trove(&tmp)
        .args([
            "-f",
            "id",
            "org",
            "emp",
            "add",
            "Ines Park",
            "--role",
            "scientist",
            "--dept",
            "D002",
            "--salary",
            "64000",
            "--specialization",
            "Soil Microbiology",
            "--hired",
            "2024-07-01",
        ])
        .assert()
        .success()
        .stdout("S011\n");

    let dept = json(trove(&tmp).args(["org", "dept", "list", "--region", "plains"]));
    assert_eq!(dept[0]["id"], "D002");
    assert_eq!(dept[0]["employee_count"], 7);
}

#[test]
fn test_add_employee_without_fields_fails() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "emp", "add", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing employee fields"));
}

#[test]
fn test_employee_ids_ignore_case() {
    let tmp = seeded_org();
    let emp = json(trove(&tmp).args(["org", "emp", "show", "s003"]));
    assert_eq!(emp["id"], "S003");
    assert_eq!(emp["name"], "Aran Pike");
}

#[test]
fn test_unknown_employee_is_not_found() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "emp", "show", "S999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_salary_sort_descending() {
    let tmp = seeded_org();
    let sorted = json(trove(&tmp).args(["org", "emp", "sort", "--by", "salary", "--desc"]));
    let sorted = sorted.as_array().unwrap();
    assert_eq!(sorted.len(), 22);
    assert_eq!(sorted[0]["id"], "M005");
    assert_eq!(sorted[21]["id"], "T006");
}

#[test]
fn test_desc_applies_to_id_sort_with_bubble() {
    let tmp = seeded_org();
    let sorted = json(trove(&tmp).args([
        "org", "emp", "sort", "--by", "id", "--desc", "--algorithm", "bubble",
    ]));
    let sorted = sorted.as_array().unwrap();
    assert_eq!(sorted[0]["id"], "T007");
    assert_eq!(sorted[21]["id"], "M001");
}

#[test]
fn test_generated_department_id_after_lowercase_id() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "dept", "add", "Wetlands", "--id", "d006"])
        .assert()
        .success();
    trove(&tmp)
        .args(["org", "dept", "add", "Coastal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("D007"));
}

#[test]
fn test_project_lifecycle() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["org", "project", "suspend", "P002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SUSPENDED"));

    let suspended = json(trove(&tmp).args(["org", "project", "list", "--status", "suspended"]));
    assert_eq!(suspended.as_array().unwrap().len(), 1);

    trove(&tmp)
        .args(["org", "project", "reactivate", "P002"])
        .assert()
        .success();
    trove(&tmp)
        .args(["org", "project", "complete", "P002"])
        .assert()
        .success();
    trove(&tmp)
        .args(["org", "project", "suspend", "P002"])
        .assert()
        .failure();
}

#[test]
fn test_department_budget_allocation() {
    let tmp = seeded_org();
    let dept = json(trove(&tmp).args(["org", "dept", "allocate", "D005", "100000"]));
    assert_eq!(dept["budget"], 500000.0);

    trove(&tmp)
        .args(["org", "dept", "allocate", "D005", "900000"])
        .assert()
        .failure();

    let dept = json(trove(&tmp).args(["org", "dept", "fund", "D005", "250000"]));
    assert_eq!(dept["budget"], 750000.0);
}

#[test]
fn test_dept_list_csv_header() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["-f", "csv", "org", "dept", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,name,region,budget,manager,staff"));
}

#[test]
fn test_add_department_prints_generated_id() {
    let tmp = seeded_org();
    trove(&tmp)
        .args(["-f", "id", "org", "dept", "add", "Hydrology", "--region", "Delta"])
        .assert()
        .success()
        .stdout("D006\n");
}

// ============================================================================
// Library Tests
// ============================================================================

#[test]
fn test_borrow_sets_due_date() {
    let tmp = seeded_library();
    let loan = json(trove(&tmp).args(["lib", "borrow", "U005", "M003", "--date", "2024-02-20"]));
    assert_eq!(loan["user_id"], "U005");
    assert_eq!(loan["media_id"], "M003");
    assert_eq!(loan["due_date"], "2024-03-05");

    let borrowed = json(trove(&tmp).args(["lib", "media", "list", "--borrowed"]));
    assert_eq!(borrowed.as_array().unwrap().len(), 1);
    assert_eq!(borrowed[0]["borrowed_by"], "U005");
}

#[test]
fn test_late_return_charges_fee_and_blocks_borrowing() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "borrow", "U005", "M003", "--date", "2024-02-20"])
        .assert()
        .success();

    let returned = json(trove(&tmp).args(["lib", "return", "U005", "M003", "--date", "2024-03-11"]));
    assert_eq!(returned["late_fee"], 12.0);
    assert_eq!(returned["return_date"], "2024-03-11");

    trove(&tmp)
        .args(["lib", "borrow", "U005", "M001", "--date", "2024-03-12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outstanding fines"));

    trove(&tmp)
        .args(["lib", "pay", "U005", "12"])
        .assert()
        .success();
    trove(&tmp)
        .args(["lib", "borrow", "U005", "M001", "--date", "2024-03-12"])
        .assert()
        .success();
}

#[test]
fn test_overdue_report() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "borrow", "U002", "M001", "--date", "2024-02-20"])
        .assert()
        .success();

    let overdue = json(trove(&tmp).args(["lib", "overdue", "--date", "2024-03-10"]));
    let overdue = overdue.as_array().unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["media_id"], "M001");
    assert_eq!(overdue[0]["days_late"], 5);
    assert_eq!(overdue[0]["accrued_fee"], 5.0);

    let none = json(trove(&tmp).args(["lib", "overdue", "--date", "2024-03-05"]));
    assert!(none.as_array().unwrap().is_empty());
}

#[test]
fn test_borrowed_item_cannot_be_lent_twice() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "borrow", "U002", "M004", "--date", "2024-02-20"])
        .assert()
        .success();
    trove(&tmp)
        .args(["lib", "borrow", "U003", "M004", "--date", "2024-02-21"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));
}

#[test]
fn test_librarian_cannot_borrow() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "borrow", "U001", "M001"])
        .assert()
        .failure();
}

#[test]
fn test_return_without_loan_fails() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "return", "U002", "M001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no open loan"));
}

#[test]
fn test_unknown_user_is_not_found() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "borrow", "U999", "M001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_library_ids_are_exact() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "media", "show", "m001"])
        .assert()
        .failure();
    trove(&tmp)
        .args(["lib", "media", "show", "M001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Tidal Shelf"));
}

#[test]
fn test_media_search_by_author() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["-f", "id", "lib", "media", "search", "--author", "norberg"])
        .assert()
        .success()
        .stdout("M001\nM005\n");
}

#[test]
fn test_register_member_gets_next_id() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["-f", "id", "lib", "member", "add", "Wren Ashby", "--joined", "2024-05-01"])
        .assert()
        .success()
        .stdout("U007\n");
}

#[test]
fn test_loans_history() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "borrow", "U004", "M002", "--date", "2024-01-02"])
        .assert()
        .success();
    trove(&tmp)
        .args(["lib", "return", "U004", "M002", "--date", "2024-01-05"])
        .assert()
        .success();
    trove(&tmp)
        .args(["lib", "borrow", "U004", "M006", "--date", "2024-01-06"])
        .assert()
        .success();

    let all = json(trove(&tmp).args(["lib", "loans", "U004", "--all"]));
    assert_eq!(all.as_array().unwrap().len(), 2);
    let open = json(trove(&tmp).args(["lib", "loans", "U004"]));
    assert_eq!(open.as_array().unwrap().len(), 1);
    assert_eq!(open[0]["media_id"], "M006");
}

#[test]
fn test_library_check_passes_after_circulation() {
    let tmp = seeded_library();
    trove(&tmp)
        .args(["lib", "borrow", "U003", "M007", "--date", "2024-04-01"])
        .assert()
        .success();
    trove(&tmp)
        .args(["lib", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent"));
}

// ============================================================================
// Backend Tests
// ============================================================================

#[test]
fn test_sqlite_backend_round_trip() {
    let tmp = TempDir::new().unwrap();
    trove(&tmp)
        .args(["--backend", "sqlite", "org", "seed"])
        .assert()
        .success();
    assert!(tmp.path().join("trove.db").is_file());
    assert!(!tmp.path().join("employees.txt").exists());

    trove(&tmp)
        .args(["--backend", "sqlite", "org", "equip", "assign", "E010", "T007"])
        .assert()
        .success();
    let item = json(trove(&tmp).args(["--backend", "sqlite", "org", "equip", "list", "--type", "computer"]));
    let e010 = item
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "E010")
        .unwrap();
    assert_eq!(e010["assigned_to"], "T007");
}

#[test]
fn test_backend_from_environment() {
    let tmp = TempDir::new().unwrap();
    trove(&tmp)
        .env("TROVE_BACKEND", "sqlite")
        .args(["lib", "seed"])
        .assert()
        .success();
    assert!(tmp.path().join("trove.db").is_file());
}

#[test]
fn test_missing_data_dir_fails() {
    let tmp = TempDir::new().unwrap();
    bare()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path())
        .args(["org", "stats"])
        .assert()
        .failure();
}
