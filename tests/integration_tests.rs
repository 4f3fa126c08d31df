//! Integration tests for the aql CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an aql command
fn aql() -> Command {
    let mut cmd = Command::cargo_bin("aql").unwrap();
    cmd.env("AQL_AUTHOR", "Test Inspector").env_remove("AQL_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    aql().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to create an inspection and return its full ID
fn create_inspection(tmp: &TempDir, quantity: &str, dims: &[&str]) -> String {
    let mut args = vec!["insp", "new", "--title", "Frame batch", "-Q", quantity, "-f", "id"];
    for dim in dims {
        args.push("--dim");
        args.push(dim);
    }

    let output = aql().current_dir(tmp.path()).args(&args).output().unwrap();
    assert!(output.status.success(), "insp new failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn measure(tmp: &TempDir, id: &str, dim: &str, sample: &str, value: &str) -> assert_cmd::assert::Assert {
    aql()
        .current_dir(tmp.path())
        .args(["insp", "measure", id, "--dim", dim, "--sample", sample, value])
        .assert()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    aql()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ISO 2859-1"));
}

#[test]
fn test_version_displays() {
    aql()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aql"));
}

#[test]
fn test_unknown_command_fails() {
    aql()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    aql()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized AQL project"));

    assert!(tmp.path().join(".aql/config.yaml").exists());
    assert!(tmp.path().join("inspections").is_dir());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();

    aql()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();

    aql()
        .current_dir(tmp.path())
        .args(["insp", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an AQL project"));
}

// ============================================================================
// Plan Command Tests
// ============================================================================

#[test]
fn test_plan_resolves_letter_and_row() {
    aql()
        .args(["plan", "100", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"letter\": \"F\""))
        .stdout(predicate::str::contains("\"size\": 2"))
        .stdout(predicate::str::contains("\"ac\": \"#\""));
}

#[test]
fn test_plan_boundaries() {
    for (quantity, letter) in [("8", "A"), ("9", "B"), ("280", "G"), ("281", "H"), ("500001", "Q")] {
        aql()
            .args(["plan", quantity, "-f", "id"])
            .assert()
            .success()
            .stdout(format!("{}\n", letter));
    }
}

#[test]
fn test_plan_rejects_invalid_quantity() {
    for quantity in ["0", "-5", "abc"] {
        aql()
            .args(["plan", quantity])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid batch quantity"));
    }
}

// ============================================================================
// Table Command Tests
// ============================================================================

#[test]
fn test_table_show_single_letter() {
    aql()
        .args(["table", "show", "--letter", "G"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#/2"))
        .stdout(predicate::str::contains("0/2"));
}

#[test]
fn test_table_validate_builtin() {
    aql()
        .args(["table", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in table is valid"));
}

#[test]
fn test_table_validate_rejects_bad_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.yaml");
    fs::write(&path, "G:\n  second: { size: 3, ac: 2, re: 2 }\n").unwrap();

    aql()
        .args(["table", "validate"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid Ac/Re table"));
}

#[test]
fn test_custom_table_from_config_is_used() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join("acre.yaml"),
        "G:\n  first: { size: 3, ac: 1, re: 4 }\n",
    )
    .unwrap();
    fs::write(tmp.path().join(".aql/config.yaml"), "acre_table: acre.yaml\n").unwrap();

    aql()
        .current_dir(tmp.path())
        .args(["table", "show", "--letter", "G"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/4"));

    aql()
        .current_dir(tmp.path())
        .args(["table", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no entry"));
}

#[test]
fn test_broken_project_config_aborts() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join(".aql/config.yaml"),
        "acre_table: acre.yaml\ncoating_requirements: [85, 70\n",
    )
    .unwrap();

    aql()
        .current_dir(tmp.path())
        .args(["table", "show", "--letter", "G"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

// ============================================================================
// Inspection Tests
// ============================================================================

#[test]
fn test_insp_new_and_list() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);
    assert!(id.starts_with("INSP-"));
    assert!(tmp.path().join(format!("inspections/{}.aql.yaml", id)).exists());

    aql()
        .current_dir(tmp.path())
        .args(["insp", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frame batch"))
        .stdout(predicate::str::contains("F/2"));

    aql()
        .current_dir(tmp.path())
        .args(["insp", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_insp_new_rejects_bad_dimension() {
    let tmp = setup_test_project();

    aql()
        .current_dir(tmp.path())
        .args(["insp", "new", "-t", "Bad", "-Q", "10", "--dim", "A:10:-0.2:0.3"])
        .assert()
        .failure();

    aql()
        .current_dir(tmp.path())
        .args(["insp", "new", "-t", "Bad", "-Q", "0", "--dim", "A:10:0.2:0.3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid batch quantity"));
}

#[test]
fn test_insp_pass_after_advance() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);

    measure(&tmp, &id, "A", "1", "10.1").success();
    measure(&tmp, &id, "A", "2", "10.0")
        .success()
        .stdout(predicate::str::contains("continue with the second step"));

    aql()
        .current_dir(tmp.path())
        .args(["insp", "advance", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("second"));

    measure(&tmp, &id, "A", "1", "10.2").success();
    measure(&tmp, &id, "A", "2", "9.7")
        .success()
        .stdout(predicate::str::contains("Batch accepted"));

    aql()
        .current_dir(tmp.path())
        .args(["insp", "status", &id, "-f", "id"])
        .assert()
        .success()
        .stdout("pass\n");

    // Frozen once decided
    measure(&tmp, &id, "A", "1", "12")
        .failure()
        .stderr(predicate::str::contains("frozen"));
}

#[test]
fn test_insp_reject_on_rejection_number() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "200", &["A:10:0.2:0.3"]);

    for sample in ["1", "2", "3"] {
        measure(&tmp, &id, "A", sample, "10").success();
    }
    aql()
        .current_dir(tmp.path())
        .args(["insp", "advance", &id])
        .assert()
        .success();

    measure(&tmp, &id, "A", "1", "10.3").success();
    measure(&tmp, &id, "A", "2", "abc").success();
    measure(&tmp, &id, "A", "3", "10")
        .success()
        .stdout(predicate::str::contains("Batch rejected"));

    aql()
        .current_dir(tmp.path())
        .args(["insp", "status", &id, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"inspection_status\": \"reject\""))
        .stdout(predicate::str::contains("\"total_non_conformities\": 2"));
}

#[test]
fn test_insp_step_rules() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);

    aql()
        .current_dir(tmp.path())
        .args(["insp", "advance", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not complete"));

    aql()
        .current_dir(tmp.path())
        .args(["insp", "measure", &id, "-d", "A", "-s", "1", "--step", "third", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("third"));

    measure(&tmp, &id, "A", "1", "10").success();
    measure(&tmp, &id, "A", "2", "10").success();
    aql()
        .current_dir(tmp.path())
        .args(["insp", "advance", &id])
        .assert()
        .success();

    aql()
        .current_dir(tmp.path())
        .args(["insp", "measure", &id, "-d", "A", "-s", "1", "--step", "first", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("closed"));

    measure(&tmp, &id, "B", "1", "10")
        .failure()
        .stderr(predicate::str::contains("Unknown dimension"));
    measure(&tmp, &id, "A", "3", "10")
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_insp_short_ids_and_requantify() {
    let tmp = setup_test_project();
    create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);

    aql()
        .current_dir(tmp.path())
        .args(["insp", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@1"));

    measure(&tmp, "INSP@1", "A", "1", "10").success();

    aql()
        .current_dir(tmp.path())
        .args(["insp", "requantify", "@1", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("letter J with 8 samples"));

    aql()
        .current_dir(tmp.path())
        .args(["insp", "report", "@1", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"batch_quantity\": 1000"))
        .stdout(predicate::str::contains("\"measurements\""));
}

#[test]
fn test_insp_report_is_flat() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "10", &["A:10:0.2:0.3", "B:4:0.1:0.1:Wall"]);
    measure(&tmp, &id, "B", "2", "4.05").success();

    let output = aql()
        .current_dir(tmp.path())
        .args(["insp", "report", &id, "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let b = json["measurements"]["B"].as_array().unwrap();
    assert_eq!(b.len(), 10);
    assert_eq!(b[1], "4.05");
    assert_eq!(json["dimensions"].as_array().unwrap().len(), 2);
}

#[test]
fn test_insp_show_reports_broken_file() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);
    fs::write(
        tmp.path().join(format!("inspections/{}.aql.yaml", id)),
        "id: not-an-id\ntitle: [oops\n",
    )
    .unwrap();

    aql()
        .current_dir(tmp.path())
        .args(["insp", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inspection"));
}

#[test]
fn test_insp_with_inconsistent_sample_size_is_refused() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);
    let path = tmp.path().join(format!("inspections/{}.aql.yaml", id));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("sample_size: 2"));
    fs::write(&path, content.replace("sample_size: 2", "sample_size: 1")).unwrap();

    aql()
        .current_dir(tmp.path())
        .args(["insp", "status", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Inconsistent inspection state"));
}

#[test]
fn test_insp_show_lists_dimension_description() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3:Frame wall", "B:5:0.1:0.1"]);

    aql()
        .current_dir(tmp.path())
        .args(["insp", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frame wall"))
        .stdout(predicate::str::contains("Dimensions"));
}

#[test]
fn test_insp_measure_accepts_negative_values_and_trailing_flags() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:0:0.5:0.5"]);

    aql()
        .current_dir(tmp.path())
        .args(["insp", "measure", &id, "--dim", "A", "--sample", "1", "-0.2", "-q"])
        .assert()
        .success();

    let content = fs::read_to_string(tmp.path().join(format!("inspections/{}.aql.yaml", id))).unwrap();
    assert!(content.contains("-0.2"));
}

// ============================================================================
// Coating Tests
// ============================================================================

#[test]
fn test_coating_stats() {
    aql()
        .args(["coating", "stats", "10", "12", "14", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mean\": 12.0"))
        .stdout(predicate::str::contains("\"std_deviation\": 1.63"))
        .stdout(predicate::str::contains("\"cv_percent\": 13.6"));
}

#[test]
fn test_coating_stats_skips_empty_and_garbled() {
    aql()
        .args(["coating", "stats", "", "abc", "20", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"readings\": 1"))
        .stdout(predicate::str::contains("\"mean\": 20.0"));
}

#[test]
fn test_coating_add_and_check() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);

    aql()
        .current_dir(tmp.path())
        .args(["coating", "add", &id, "90", "95", "65"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 3 reading(s)"))
        .stdout(predicate::str::contains("below the local minimum"));

    aql()
        .current_dir(tmp.path())
        .args(["coating", "check", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coating: fail"));

    fs::write(
        tmp.path().join(".aql/config.yaml"),
        "coating_requirements:\n  mean: 80\n  local: 60\n",
    )
    .unwrap();

    aql()
        .current_dir(tmp.path())
        .args(["coating", "check", &id, "-f", "id"])
        .assert()
        .success()
        .stdout("pass\n");
}

#[test]
fn test_coating_stats_flags_after_negative_values() {
    aql()
        .args(["coating", "stats", "10", "-4", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"readings\": 2"))
        .stdout(predicate::str::contains("\"mean\": 3.0"))
        .stderr(predicate::str::contains("skipping").not());
}

#[test]
fn test_coating_add_unit_after_values() {
    let tmp = setup_test_project();
    let id = create_inspection(&tmp, "100", &["A:10:0.2:0.3"]);

    aql()
        .current_dir(tmp.path())
        .args(["coating", "add", &id, "90", "95", "-u", "mil"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 reading(s)"));

    let content = fs::read_to_string(tmp.path().join(format!("inspections/{}.aql.yaml", id))).unwrap();
    assert!(content.contains("unit: mil"));
    assert!(!content.contains("-u"));

    aql()
        .current_dir(tmp.path())
        .args(["coating", "check", &id, "-f", "id"])
        .assert()
        .success()
        .stdout("pass\n");
}

#[test]
fn test_completions_generate() {
    aql()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aql"));
}
