mod common;

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{Cell, TestWorkspace, column_values, n, read_csv, t};
use predicates::str::contains;

const SUB1: &str = "\
OID,Station Name,Component Description,Additional Information,AMP Rating,High KV,Group
163125,ALPHA,Transformer,,2000,115,G1
,ALPHA,Breaker 1,,2000,115,G1
500,BETA,Relay,,10,230,G2
";

const SUB2: &str = "\
OID,Station Name,Component Description,Additional Information,AMP Rating,High KV,Group
500,BETA,Relay,,99,230,G9
7,OMEGA,Capacitor,,50,69,G3
";

fn authoritative_rows() -> Vec<Vec<Cell>> {
    vec![
        vec![
            t("OID"),
            t("Station Name"),
            t("Component Description"),
            t("Additional Information"),
            t("High Rating"),
            t("High kV"),
        ],
        vec![n(163125.0), t("ALPHA"), t("Transformer"), Cell::Blank, n(2000.0), n(115.0)],
        vec![n(163200.0), t("ALPHA"), t("Breaker 1"), Cell::Blank, n(1200.0), n(115.0)],
        vec![n(500.0), t("BETA"), t("Relay"), Cell::Blank, n(10.0), n(230.0)],
    ]
}

fn seeded_workspace() -> TestWorkspace {
    let workspace = TestWorkspace::new();
    workspace.write("SUB1.csv", SUB1);
    workspace.write("SUB2.csv", SUB2);
    workspace.write_workbook(
        "SUB1-SUB2 115 kV -XcelUpdate.xlsx",
        "CAISO Update",
        &authoritative_rows(),
    );
    workspace
}

#[test]
fn run_writes_all_four_outputs() {
    let workspace = seeded_workspace();
    let output_dir = workspace.path().join("Final");

    cargo_bin_cmd!("substation-recon")
        .arg("run")
        .arg("--data-dir")
        .arg(workspace.path())
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stderr(contains("Processing complete"));

    let merged = read_csv(&output_dir.join("SUB1-SUB2 115kV.csv"));
    assert_eq!(
        merged[0],
        vec![
            "OID",
            "Station Name",
            "Component Description",
            "Additional Information",
            "High Rating",
            "High kV",
            "Group",
        ]
    );
    assert_eq!(
        column_values(&merged, "OID"),
        vec!["163125", "", "500", "7"]
    );
    assert_eq!(column_values(&merged, "Group")[2], "G2");

    let highlighted = read_csv(&output_dir.join("SUB1-SUB2 115kV_highlighted.csv"));
    assert_eq!(
        column_values(&highlighted, "Mismatch"),
        vec!["No", "Yes", "No", "No"]
    );
    assert_eq!(column_values(&highlighted, "High Rating")[1], "2000");

    let updated = read_csv(&output_dir.join("SUB1-SUB2 115kV_updated.csv"));
    assert_eq!(column_values(&updated, "High Rating")[1], "1200");
    assert_eq!(
        column_values(&updated, "Type of Change"),
        vec!["", "High Rating", "", ""]
    );

    let summary = read_csv(&output_dir.join("SUB1-SUB2 115kV_summary_report.csv"));
    assert_eq!(
        summary,
        vec![
            vec!["OID", "Column Updated", "Old Value", "New Value"],
            vec!["", "High Rating", "2000", "1200"],
        ]
    );
}

#[test]
fn repeated_runs_write_byte_identical_outputs() {
    let workspace = seeded_workspace();
    let outputs = [
        "SUB1-SUB2 115kV.csv",
        "SUB1-SUB2 115kV_highlighted.csv",
        "SUB1-SUB2 115kV_updated.csv",
        "SUB1-SUB2 115kV_summary_report.csv",
    ];
    let mut runs = Vec::new();
    for dir in ["first", "second"] {
        let output_dir = workspace.path().join(dir);
        cargo_bin_cmd!("substation-recon")
            .arg("run")
            .arg("--data-dir")
            .arg(workspace.path())
            .arg("--output-dir")
            .arg(&output_dir)
            .assert()
            .success();
        let contents: Vec<Vec<u8>> = outputs
            .iter()
            .map(|name| fs::read(output_dir.join(name)).expect("read output"))
            .collect();
        runs.push(contents);
    }
    for (name, (first, second)) in outputs.iter().zip(runs[0].iter().zip(&runs[1])) {
        assert!(!first.is_empty(), "{name} is empty");
        assert_eq!(first, second, "{name} differs between runs");
    }
}

#[test]
fn run_with_no_differences_writes_header_only_summary() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "SUB1.csv",
        "OID,Station Name,Component Description,AMP Rating\n163125,ALPHA,Transformer,2000.0\n",
    );
    workspace.write(
        "SUB2.csv",
        "OID,Station Name,Component Description,AMP Rating\n",
    );
    workspace.write_workbook(
        "update.xlsx",
        "CAISO Update",
        &[
            vec![
                t("OID"),
                t("Station Name"),
                t("Component Description"),
                t("High Rating"),
            ],
            vec![n(163125.0), t("ALPHA"), t("Transformer"), n(2000.0)],
        ],
    );
    let output_dir = workspace.path().join("out");

    cargo_bin_cmd!("substation-recon")
        .arg("run")
        .arg("--data-dir")
        .arg(workspace.path())
        .args(["--workbook", "update.xlsx"])
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stderr(contains("No changes to report"));

    let summary = read_csv(&output_dir.join("SUB1-SUB2 115kV_summary_report.csv"));
    assert_eq!(
        summary,
        vec![vec!["OID", "Column Updated", "Old Value", "New Value"]]
    );
}

#[test]
fn missing_sheet_fails_before_writing_outputs() {
    let workspace = seeded_workspace();
    let output_dir = workspace.path().join("Final");

    cargo_bin_cmd!("substation-recon")
        .arg("run")
        .arg("--data-dir")
        .arg(workspace.path())
        .args(["--sheet", "Nope"])
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(contains("sheet 'Nope' not found"));

    assert!(!output_dir.exists());
}

#[test]
fn missing_source_export_is_reported() {
    let workspace = seeded_workspace();
    cargo_bin_cmd!("substation-recon")
        .arg("run")
        .arg("--data-dir")
        .arg(workspace.path())
        .args(["--source-two", "SUB3.csv"])
        .arg("--output-dir")
        .arg(workspace.path().join("Final"))
        .assert()
        .failure()
        .stderr(contains("SUB3.csv"));
}

#[test]
fn columns_json_lists_every_input() {
    let workspace = seeded_workspace();
    let output = cargo_bin_cmd!("substation-recon")
        .arg("columns")
        .arg("--data-dir")
        .arg(workspace.path())
        .arg("--json")
        .output()
        .expect("run columns");
    assert!(output.status.success());

    let listing: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json listing");
    let entries = listing.as_array().expect("array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["input"], "source one");
    assert_eq!(entries[0]["columns"][4], "AMP Rating");
    assert_eq!(entries[2]["input"], "sheet 'CAISO Update'");
    assert_eq!(entries[2]["columns"][4], "High Rating");
}

#[test]
fn mapping_shows_renamed_columns_for_requested_oid() {
    let workspace = seeded_workspace();
    cargo_bin_cmd!("substation-recon")
        .arg("mapping")
        .arg("--data-dir")
        .arg(workspace.path())
        .args(["--oid", "163125"])
        .assert()
        .success()
        .stdout(contains("Mapped columns for OID 163125"))
        .stdout(contains("AMP Rating"))
        .stdout(contains("MATCH"));
}

#[test]
fn malformed_rename_is_rejected_by_argument_parsing() {
    cargo_bin_cmd!("substation-recon")
        .args(["run", "--rename", "AMP Rating"])
        .assert()
        .failure()
        .stderr(contains("FROM=TO"));
}
