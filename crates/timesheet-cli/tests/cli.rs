//! End-to-end tests of the `timesheet` binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;

const EXPORT: &str = r#"[
    ["date", "project", "description", "task_name", "hours", "task_id", "estimated_hours"],
    ["2024-02-03", "Alpha", "Cart fixes", "Cart", 2.5, "T1", 6],
    ["2024-02-20", "Alpha", "Cart polish", "Cart", 1.0, "T2", null],
    ["2024-02-21", "Beta", "Blog post", "Blog", 4.0, "T3", null]
]"#;

fn write_export(dir: &Path) -> PathBuf {
    let path = dir.join("export.json");
    std::fs::write(&path, EXPORT).unwrap();
    path
}

fn timesheet(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_timesheet"));
    cmd.args(args).env_remove("RUST_LOG");
    cmd
}

fn summary(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("summary is JSON")
}

#[test]
fn financial_report_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path());
    let out_dir = dir.path().join("reports");

    let output = timesheet(&["financial", "--rate", "50", "--exchange-rate", "41", "--summary", "-o"])
        .arg(&out_dir)
        .arg(&export)
        .output()
        .unwrap();
    let json = summary(&output);

    let file = out_dir.join("financial_february_report.xlsx");
    assert!(file.exists());
    assert_eq!(json["summary"]["report_type"], "financial");
    assert_eq!(json["summary"]["entries"], 3);
    assert_eq!(json["summary"]["projects"], 2);
    assert_eq!(json["layout"]["rate_cell_address"], "$G$13");

    let mut workbook = open_workbook_auto(&file).unwrap();
    let sheet = workbook.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(sheet.get_value((12, 6)), Some(&Data::Float(50.0)));
    assert_eq!(sheet.get_value((13, 6)), Some(&Data::Float(41.0)));
}

#[test]
fn rate_can_come_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path());

    let output = timesheet(&["financial", "--summary", "-o"])
        .arg(dir.path())
        .arg(&export)
        .env("TIMESHEET_RATE", "35")
        .env("TIMESHEET_EXCHANGE_RATE", "39.5")
        .output()
        .unwrap();
    let json = summary(&output);
    assert_eq!(json["summary"]["month"], "february");
}

#[test]
fn split_half_project_report() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path());

    let output = timesheet(&["project", "--grouping", "split_half", "--summary", "-o"])
        .arg(dir.path())
        .arg(&export)
        .output()
        .unwrap();
    let json = summary(&output);
    assert_eq!(json["summary"]["report_type"], "split_half_project");

    let file = dir.path().join("split_half_project_february_report.xlsx");
    let mut workbook = open_workbook_auto(&file).unwrap();
    let sheet = workbook.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(
        sheet.get_value((1, 0)),
        Some(&Data::String("Period: 01.02.2024 – 15.02.2024".into()))
    );
}

#[test]
fn theme_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path());
    let theme = dir.path().join("theme.toml");
    std::fs::write(&theme, "font_name = \"Arial\"\nheader_fill = \"#336699\"\n").unwrap();

    let output = timesheet(&["project", "-o"])
        .arg(dir.path())
        .arg("--theme")
        .arg(&theme)
        .arg(&export)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Wrote "));
    assert!(dir.path().join("full_month_project_february_report.xlsx").exists());
}

#[test]
fn invalid_theme_fails() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path());
    let theme = dir.path().join("theme.toml");
    std::fs::write(&theme, "header_fill = \"blue\"\n").unwrap();

    let output = timesheet(&["project", "--theme"])
        .arg(&theme)
        .arg(&export)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid theme"));
}

#[test]
fn unknown_grouping_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path());

    let output = timesheet(&["project", "--grouping", "weekly"]).arg(&export).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn missing_export_fails_with_context() {
    let output = timesheet(&["project", "/nonexistent/export.json"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read export"));
}

#[test]
fn empty_export_fails() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.json");
    std::fs::write(&export, r#"[["date"]]"#).unwrap();

    let output = timesheet(&["financial", "--rate", "50", "--exchange-rate", "41"])
        .arg(&export)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Empty dataset"));
}
