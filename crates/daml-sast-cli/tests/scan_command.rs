// daml-sast-cli/tests/scan_command.rs
// ============================================================================
// Module: CLI Scan Command Tests
// Description: Integration tests for the daml-sast binary.
// Purpose: Pin the exit-code contract, report formats, and config layering.
// Dependencies: daml-sast binary, daml-sast-core test fixtures
// ============================================================================

//! ## Overview
//! Builds real DAR archives with the core fixtures, runs the `daml-sast`
//! binary against them, and checks exit codes, stdout reports, and stderr
//! diagnostics. Every run clears `DAML_SAST_*` variables and uses a fresh
//! working directory so no ambient config leaks in.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

#[path = "../../daml-sast-core/tests/common/mod.rs"]
mod fixtures;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use fixtures::PackageBuilder;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn daml_sast_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_daml-sast"))
}

/// Writes a DAR holding one template without signatories.
fn orphan_dar(dir: &Path) -> PathBuf {
    let mut builder = PackageBuilder::new();
    let signatories = builder.party_list(&[]);
    let observers = builder.party_list(&[]);
    let template = builder.template("Orphan", signatories, observers);
    builder.add_template("Main", template);
    let dar = fixtures::single_package_dar(&builder.build(), 1, "17");
    let path = dir.join("app.dar");
    fs::write(&path, dar).expect("write dar");
    path
}

fn run_in(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut command = Command::new(daml_sast_bin());
    command.current_dir(dir).args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("DAML_SAST_") {
            command.env_remove(key);
        }
    }
    command.envs(envs.iter().copied());
    command.output().expect("run daml-sast")
}

fn scan(dir: &Path, extra: &[&str]) -> Output {
    let dar = orphan_dar(dir);
    let dar = dar.to_string_lossy().into_owned();
    let mut args = vec!["scan", "--dar", dar.as_str()];
    args.extend_from_slice(extra);
    run_in(dir, &args, &[])
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().expect("exit code")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn workspace() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

#[test]
fn findings_below_an_unset_threshold_exit_zero() {
    let dir = workspace();
    let output = scan(dir.path(), &[]);
    assert_eq!(exit_code(&output), 0, "{}", stderr_text(&output));

    let findings = stdout_json(&output);
    let findings = findings.as_array().expect("finding array");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["id"], "DAML-AUTH-003");
    assert_eq!(findings[0]["severity"], "HIGH");
    assert_eq!(findings[0]["location"]["definition"], "Template Main.Orphan");
    assert!(!findings[0]["fingerprint"].as_str().unwrap().is_empty());
}

#[test]
fn findings_at_the_threshold_exit_one() {
    let dir = workspace();
    let output = scan(dir.path(), &["--fail-on", "high"]);
    assert_eq!(exit_code(&output), 1);

    let output = scan(dir.path(), &["--fail-on", "CRITICAL"]);
    assert_eq!(exit_code(&output), 0);
}

#[test]
fn ci_mode_fails_on_medium_and_above() {
    let dir = workspace();
    let output = scan(dir.path(), &["--ci"]);
    assert_eq!(exit_code(&output), 1);
}

#[test]
fn severity_filter_runs_before_classification() {
    let dir = workspace();
    let output = scan(dir.path(), &["--severity", "critical", "--fail-on", "low"]);
    assert_eq!(exit_code(&output), 0);
    assert_eq!(stdout_json(&output), Value::Array(Vec::new()));
}

#[test]
fn unknown_rule_ids_exit_two() {
    let dir = workspace();
    let output = scan(dir.path(), &["--rules", "DAML-AUTH-999"]);
    assert_eq!(exit_code(&output), 2);
    assert!(stderr_text(&output).contains("unknown rule id: DAML-AUTH-999"));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_dar_exits_two_and_malformed_dar_exits_three() {
    let dir = workspace();
    let output = run_in(dir.path(), &["scan", "--dar", "absent.dar"], &[]);
    assert_eq!(exit_code(&output), 2);

    fs::write(dir.path().join("broken.dar"), b"not a zip archive").unwrap();
    let output = run_in(dir.path(), &["scan", "--dar", "broken.dar"], &[]);
    assert_eq!(exit_code(&output), 3);
    assert!(stderr_text(&output).starts_with("error: "));
}

#[test]
fn archive_size_limit_from_the_environment_exits_three() {
    let dir = workspace();
    let dar = orphan_dar(dir.path());
    let dar = dar.to_string_lossy().into_owned();
    let output =
        run_in(dir.path(), &["scan", "--dar", &dar], &[("DAML_SAST_MAX_DAR_BYTES", "16")]);
    assert_eq!(exit_code(&output), 3);
    assert!(stderr_text(&output).contains("archive_bytes"));
}

#[test]
fn out_with_both_formats_exits_two() {
    let dir = workspace();
    let output = scan(dir.path(), &["--format", "both", "--out", "report.json"]);
    assert_eq!(exit_code(&output), 2);
}

// ============================================================================
// SECTION: Reports
// ============================================================================

#[test]
fn sarif_report_carries_rules_fingerprints_and_ci_details() {
    let dir = workspace();
    let json = stdout_json(&scan(dir.path(), &[]));
    let fingerprint = json[0]["fingerprint"].as_str().unwrap().to_string();

    let out = dir.path().join("reports").join("scan.sarif");
    let out_arg = out.to_string_lossy().into_owned();
    let output = scan(dir.path(), &["--format", "sarif", "--out", &out_arg, "--ci"]);
    assert_eq!(exit_code(&output), 1);
    assert!(output.stdout.is_empty());

    let sarif: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
    let run = &sarif["runs"][0];
    let rules = run["tool"]["driver"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 9);
    assert_eq!(run["automationDetails"]["id"], "daml-sast-ci");
    assert_eq!(run["properties"]["ci"], true);
    assert!(run["invocations"][0]["startTimeUtc"].as_str().unwrap().contains('T'));

    let result = &run["results"][0];
    assert_eq!(result["ruleId"], "DAML-AUTH-003");
    assert_eq!(result["level"], "error");
    assert_eq!(result["partialFingerprints"]["damlSast/v1"], fingerprint.as_str());
    let index = usize::try_from(result["ruleIndex"].as_u64().unwrap()).unwrap();
    assert_eq!(rules[index]["id"], "DAML-AUTH-003");
    assert_eq!(result["locations"][0]["logicalLocations"][0]["kind"], "type");
}

#[test]
fn both_formats_write_json_then_sarif_to_stdout() {
    let dir = workspace();
    let output = scan(dir.path(), &["--format", "both"]);
    assert_eq!(exit_code(&output), 0);
    let text = String::from_utf8(output.stdout).unwrap();
    let mut documents = serde_json::Deserializer::from_str(&text).into_iter::<Value>();
    assert!(documents.next().unwrap().unwrap().is_array());
    assert_eq!(documents.next().unwrap().unwrap()["version"], "2.1.0");
    assert!(documents.next().is_none());
}

#[test]
fn log_events_stream_json_lines_to_stderr() {
    let dir = workspace();
    let output = scan(dir.path(), &["--log-events"]);
    assert_eq!(exit_code(&output), 0);
    let stderr = stderr_text(&output);
    assert!(stderr.contains("\"event\":\"archive_read\""));
    assert!(stderr.contains("\"event\":\"scan_completed\""));
}

// ============================================================================
// SECTION: Config, Baselines, and Suppressions
// ============================================================================

#[test]
fn config_file_selects_rules_and_threshold() {
    let dir = workspace();
    fs::write(dir.path().join("daml-sast.toml"), "[scanner]\nci = true\n").unwrap();
    let output = scan(dir.path(), &[]);
    assert_eq!(exit_code(&output), 1, "config in the working directory should load");

    let config = dir.path().join("quiet.toml");
    fs::write(&config, "[rules]\ndeny = [\"DAML-AUTH-003\"]\n").unwrap();
    let config_arg = config.to_string_lossy().into_owned();
    let output = scan(dir.path(), &["--config", &config_arg, "--ci"]);
    assert_eq!(exit_code(&output), 0);
    assert_eq!(stdout_json(&output), Value::Array(Vec::new()));
}

#[test]
fn invalid_config_exits_two() {
    let dir = workspace();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[limits]\nmax_entries = 0\n").unwrap();
    let config_arg = config.to_string_lossy().into_owned();
    let output = scan(dir.path(), &["--config", &config_arg]);
    assert_eq!(exit_code(&output), 2);
    assert!(stderr_text(&output).contains("limits.max_entries must be greater than zero"));
}

#[test]
fn written_baseline_suppresses_known_findings() {
    let dir = workspace();
    let output = scan(dir.path(), &["--write-baseline", "baseline.json", "--fail-on", "high"]);
    assert_eq!(exit_code(&output), 1, "writing a baseline does not hide findings");
    let baseline: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("baseline.json")).unwrap())
            .unwrap();
    assert_eq!(baseline["rules_version"], "2026.1");

    let output = scan(dir.path(), &["--baseline", "baseline.json", "--fail-on", "high"]);
    assert_eq!(exit_code(&output), 0);
    assert_eq!(stdout_json(&output), Value::Array(Vec::new()));
}

#[test]
fn baseline_from_another_catalog_is_ignored_with_a_warning() {
    let dir = workspace();
    scan(dir.path(), &["--write-baseline", "baseline.json"]);
    let path = dir.path().join("baseline.json");
    let text = fs::read_to_string(&path).unwrap().replace("2026.1", "1999.1");
    fs::write(&path, text).unwrap();

    let output = scan(dir.path(), &["--baseline", "baseline.json", "--fail-on", "high"]);
    assert_eq!(exit_code(&output), 1);
    assert!(stderr_text(&output).contains("baseline ignored"));
}

#[test]
fn suppression_file_removes_matching_findings() {
    let dir = workspace();
    fs::write(dir.path().join(".daml-sast-ignore"), "# accepted\nDAML-AUTH-003 Main\n").unwrap();
    let output = scan(dir.path(), &["--suppressions", ".daml-sast-ignore", "--ci"]);
    assert_eq!(exit_code(&output), 0);
    assert_eq!(stdout_json(&output), Value::Array(Vec::new()));

    fs::write(dir.path().join("broken-ignore"), "DAML-AUTH-003 \"unterminated\n").unwrap();
    let output = scan(dir.path(), &["--suppressions", "broken-ignore"]);
    assert_eq!(exit_code(&output), 2);
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

#[test]
fn rules_command_lists_the_catalog() {
    let dir = workspace();
    let output = run_in(dir.path(), &["rules"], &[]);
    assert_eq!(exit_code(&output), 0);
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.lines().count(), 9);
    assert!(text.lines().next().unwrap().starts_with("DAML-AUTH-001"));

    let output = run_in(dir.path(), &["rules", "--format", "json"], &[]);
    let catalog = stdout_json(&output);
    assert_eq!(catalog["rules_version"], "2026.1");
    assert_eq!(catalog["rules"].as_array().unwrap().len(), 9);
    assert_eq!(catalog["rules"][8]["id"], "DAML-DET-001");
}

#[test]
fn versions_command_prints_the_version_matrix() {
    let dir = workspace();
    let output = run_in(dir.path(), &["versions"], &[]);
    assert_eq!(exit_code(&output), 0);
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("rules 2026.1"));
    let lf = text.lines().find(|line| line.starts_with("daml-lf ")).unwrap();
    assert!(lf.contains("1.17"));
}
