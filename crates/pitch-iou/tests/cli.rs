#![cfg(feature = "cli")]

use assert_cmd::Command;
use pitch_iou::{EvaluateConfig, EvaluationReport, ScenarioParams, SweepConfig, SweepReport};
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("pitch-iou").expect("binary")
}

#[test]
fn evaluate_prints_a_json_report() {
    let out = cli()
        .args(["evaluate", "--pan=-30", "--tilt=-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"aggregate_iou\""))
        .get_output()
        .stdout
        .clone();
    let report: EvaluationReport = serde_json::from_slice(&out).expect("report json");
    assert!(report.aggregate_iou > 0.95);
    assert_eq!(report.params, ScenarioParams::default());
}

#[test]
fn log_level_flag_enables_info_lines() {
    cli()
        .args(["--log-level", "info", "evaluate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("aggregate iou"));
}

#[cfg(not(feature = "tracing"))]
#[test]
fn plain_logger_defaults_to_warn() {
    cli()
        .arg("evaluate")
        .env_remove("PITCH_IOU_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("aggregate iou").not());
}

#[test]
fn evaluate_writes_report_and_mask() {
    let dir = tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let mask_path = dir.path().join("mask.png");

    cli()
        .arg("evaluate")
        .arg("--report")
        .arg(&report_path)
        .arg("--mask")
        .arg(&mask_path)
        .args(["--policy", "drop-off-image", "--noise", "0.25", "--seed", "3"])
        .assert()
        .success();

    let report = EvaluationReport::load_json(&report_path).expect("report");
    assert_eq!(report.correspondences, report.visible_points);
    let mask = image::open(&mask_path).expect("png").to_luma8();
    assert_eq!(mask.dimensions(), (1280, 720));
    assert!(mask.pixels().any(|p| p.0[0] != 0));
}

#[test]
fn run_reads_an_evaluate_config() {
    let dir = tempdir().unwrap();
    let cfg_path = dir.path().join("cfg.json");
    let report_path = dir.path().join("out.json");

    let mut cfg = EvaluateConfig::default();
    cfg.scenario.camera.pan_deg = 180.0;
    cfg.report_path = Some(report_path.display().to_string());
    cfg.write_json(&cfg_path).unwrap();

    cli()
        .args(["run", "--config"])
        .arg(&cfg_path)
        .assert()
        .success();

    let report = EvaluationReport::load_json(&report_path).expect("report");
    assert_eq!(report.aggregate_iou, 0.0);
}

#[test]
fn sweep_writes_one_entry_per_scenario() {
    let dir = tempdir().unwrap();
    let cfg_path = dir.path().join("sweep.json");
    let out_path = dir.path().join("sweep_out.json");

    let mut cfg = SweepConfig::default();
    cfg.scenarios.push(ScenarioParams::default());
    let mut broken = ScenarioParams::default();
    broken.camera.focal_length = -5.0;
    cfg.scenarios.push(broken);
    cfg.write_json(&cfg_path).unwrap();

    cli()
        .args(["sweep", "--config"])
        .arg(&cfg_path)
        .arg("--out")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("evaluated 1 scenarios (1 failed)"));

    let report = SweepReport::load_json(&out_path).expect("sweep report");
    assert_eq!(report.entries.len(), 2);
    assert!(report.entries[0].report.is_some());
    assert!(report.entries[1]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("focal")));
}

#[test]
fn invalid_pitch_is_reported_on_stderr() {
    cli()
        .args(["evaluate", "--length", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn missing_config_fails() {
    let dir = tempdir().unwrap();
    cli()
        .args(["run", "--config"])
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
