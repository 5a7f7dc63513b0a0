//! Integration tests for the fleet binary.
//!
//! These tests verify end-to-end behavior including:
//! - Registering vehicles and customers
//! - The rent/return lifecycle across separate invocations
//! - Data persistence and reload
//! - Listing output

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary pointed at `data_dir`, isolated from any user config
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleet"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn seed(data_dir: &Path) {
    cli(data_dir)
        .args(["add-vehicle", "--plate", "AAA100", "--make", "toyota"])
        .args(["--model", "corolla", "--year", "2019"])
        .assert()
        .success();
    cli(data_dir)
        .args(["add-customer", "--id", "1", "--name", "George"])
        .assert()
        .success();
}

fn rent(data_dir: &Path, date: &str) -> assert_cmd::assert::Assert {
    cli(data_dir)
        .args(["rent", "--plate", "AAA100", "--customer", "1"])
        .args(["--amount", "200.0", "--date", date])
        .assert()
}

fn return_vehicle(data_dir: &Path, date: &str) -> assert_cmd::assert::Assert {
    cli(data_dir)
        .args(["return", "--plate", "AAA100", "--customer", "1"])
        .args(["--fees", "50.0", "--date", date])
        .assert()
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("fleet"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vehicle rental ledger"));
}

#[test]
fn test_add_vehicle_writes_row() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    seed(data_dir);

    let vehicles = fs::read_to_string(data_dir.join("vehicles.txt")).unwrap();
    assert_eq!(vehicles, "AAA100,Toyota,Corolla,2019,Available\n");

    let customers = fs::read_to_string(data_dir.join("customers.txt")).unwrap();
    assert_eq!(customers, "1,George\n");
}

#[test]
fn test_duplicate_vehicle_refused() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    seed(data_dir);

    cli(data_dir)
        .args(["add-vehicle", "--plate", "AAA100", "--year", "2021"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let vehicles = fs::read_to_string(data_dir.join("vehicles.txt")).unwrap();
    assert_eq!(vehicles.lines().count(), 1);
}

#[test]
fn test_duplicate_customer_refused() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    seed(data_dir);

    cli(data_dir)
        .args(["add-customer", "--id", "1", "--name", "Someone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate customer"));
}

#[test]
fn test_invalid_plate_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["add-vehicle", "--plate", "AAA1000", "--year", "2019"])
        .assert()
        .failure();

    assert!(!data_dir.join("vehicles.txt").exists());
}

#[test]
fn test_rent_return_cycle_across_invocations() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    seed(data_dir);

    rent(data_dir, "2024-01-01")
        .success()
        .stdout(predicate::str::contains("rented"));
    rent(data_dir, "2024-01-01")
        .failure()
        .stderr(predicate::str::contains("not available"));

    cli(data_dir)
        .args(["vehicles", "--status", "Rented"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AAA100"));

    return_vehicle(data_dir, "2024-01-05")
        .success()
        .stdout(predicate::str::contains("returned"));
    return_vehicle(data_dir, "2024-01-05")
        .failure()
        .stderr(predicate::str::contains("not rented"));

    let records = fs::read_to_string(data_dir.join("rental_records.txt")).unwrap();
    assert_eq!(
        records,
        "RENT,AAA100,George,2024-01-01,200.0\nRETURN,AAA100,George,2024-01-05,50.0\n"
    );
}

#[test]
fn test_rent_unknown_customer_refused() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    seed(data_dir);

    cli(data_dir)
        .args(["rent", "--plate", "AAA100", "--customer", "42", "--amount", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No customer with ID 42"));

    assert!(!data_dir.join("rental_records.txt").exists());
}

#[test]
fn test_vehicle_listing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .arg("vehicles")
        .assert()
        .success()
        .stdout(predicate::str::contains("No Vehicles found"));

    seed(data_dir);
    cli(data_dir)
        .arg("vehicles")
        .assert()
        .success()
        .stdout(predicate::str::contains("=== All Vehicles ==="))
        .stdout(predicate::str::contains("Corolla"))
        .stdout(predicate::str::contains("Available"));

    cli(data_dir)
        .args(["vehicles", "--status", "Held"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No vehicles with Status: Held"));
}

#[test]
fn test_unknown_status_filter_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["vehicles", "--status", "Parked"])
        .assert()
        .failure();
}

#[test]
fn test_history_json() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    seed(data_dir);
    rent(data_dir, "2024-01-01").success();
    return_vehicle(data_dir, "2024-01-05").success();

    let output = cli(data_dir)
        .args(["history", "--json"])
        .output()
        .expect("run history");
    assert!(output.status.success());

    let history: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["kind"], "RENT");
    assert_eq!(records[1]["kind"], "RETURN");
    assert_eq!(records[1]["date"], "2024-01-05");
    assert_eq!(records[0]["customer"]["name"], "George");
    assert_eq!(records[0]["vehicle"]["status"], "Available");
}

#[test]
fn test_customer_listing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    seed(data_dir);

    cli(data_dir)
        .arg("customers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Customer ID: 1 | Name: George"));
}

#[test]
fn test_config_file_names() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let config_path = data_dir.join("fleet.toml");
    fs::write(&config_path, "[files]\ncustomers = \"roster.txt\"\n").unwrap();

    cli(data_dir)
        .arg("--config")
        .arg(&config_path)
        .args(["add-customer", "--id", "3", "--name", "Ada"])
        .assert()
        .success();

    assert!(data_dir.join("roster.txt").exists());
    assert!(!data_dir.join("customers.txt").exists());
}
