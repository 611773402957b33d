//! Config parsing and validation tests for daml-sast-config.
// daml-sast-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate section parsing, defaults, and cross-field rules.
// Purpose: Ensure every accepted config is one the scanner can honor.
// =============================================================================

mod common;

use common::TestResult;
use common::assert_invalid;
use daml_sast_config::BaselineWrite;
use daml_sast_config::ReportFormat;
use daml_sast_config::ScanConfig;
use daml_sast_core::Severity;
use daml_sast_core::lf::ArchiveLimits;

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = ScanConfig::parse("").map_err(|err| err.to_string())?;
    if config != ScanConfig::default() {
        return Err("empty config should equal the defaults".to_string());
    }
    if config.limits.archive_limits() != ArchiveLimits::default() {
        return Err("default limits should match the archive defaults".to_string());
    }
    if config.effective_fail_on().is_some() {
        return Err("fail_on should be unset by default".to_string());
    }
    Ok(())
}

#[test]
fn full_config_parses_every_section() -> TestResult {
    let config = ScanConfig::parse(
        r#"
[scanner]
format = "sarif"
severity = "medium"
fail_on = "HIGH"
ci = true
skip_bad_packages = true

[rules]
allow = ["DAML-AUTH-001", "DAML-PRIV-001"]
deny = ["DAML-DET-001"]

[baseline]
path = "baseline.json"
write = true

[suppressions]
path = ".daml-sast-ignore"

[limits]
max_entries = 16
max_proto_depth = 64
"#,
    )
    .map_err(|err| err.to_string())?;

    if config.scanner.format != Some(ReportFormat::Sarif) {
        return Err("format should be sarif".to_string());
    }
    if config.scanner.severity != Some(Severity::Medium) {
        return Err("severity labels should be case-insensitive".to_string());
    }
    if config.effective_fail_on() != Some(Severity::High) {
        return Err("explicit fail_on should win over the CI default".to_string());
    }
    if !config.scanner.skip_bad_packages {
        return Err("skip_bad_packages should be set".to_string());
    }
    let selection = config.rules.selection();
    let allow = selection.allow.ok_or("allowlist should be set")?;
    if allow.len() != 2 || !selection.deny.contains("DAML-DET-001") {
        return Err("allow and deny lists should be kept".to_string());
    }
    if config.baseline.write_path() != Some("baseline.json") {
        return Err("write = true should reuse baseline.path".to_string());
    }
    if config.suppressions.path.as_deref() != Some(".daml-sast-ignore") {
        return Err("suppressions.path should be kept".to_string());
    }
    let limits = config.limits.archive_limits();
    if limits.max_entries != 16 || limits.max_proto_depth != 64 {
        return Err("limit overrides should apply".to_string());
    }
    if limits.max_dar_bytes != ArchiveLimits::default().max_dar_bytes {
        return Err("unset limits should keep their defaults".to_string());
    }
    Ok(())
}

#[test]
fn ci_mode_defaults_fail_on_to_medium() -> TestResult {
    let config = ScanConfig::parse("[scanner]\nci = true\n").map_err(|err| err.to_string())?;
    if config.effective_fail_on() != Some(Severity::Medium) {
        return Err("ci should imply fail_on = MEDIUM".to_string());
    }
    Ok(())
}

#[test]
fn baseline_write_accepts_a_separate_path() -> TestResult {
    let config = ScanConfig::parse("[baseline]\nwrite = \"new-baseline.json\"\n")
        .map_err(|err| err.to_string())?;
    if config.baseline.write != Some(BaselineWrite::Path("new-baseline.json".to_string())) {
        return Err("write should parse as a path".to_string());
    }
    if config.baseline.write_path() != Some("new-baseline.json") {
        return Err("write path should be returned".to_string());
    }
    let disabled = ScanConfig::parse("[baseline]\npath = \"b.json\"\nwrite = false\n")
        .map_err(|err| err.to_string())?;
    if disabled.baseline.write_path().is_some() {
        return Err("write = false should not write".to_string());
    }
    Ok(())
}

#[test]
fn baseline_write_flag_requires_a_path() -> TestResult {
    assert_invalid(
        ScanConfig::parse("[baseline]\nwrite = true\n"),
        "baseline.write = true requires baseline.path",
    )
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    assert_invalid(ScanConfig::parse("[scanner]\nverbose = true\n"), "unknown field")?;
    assert_invalid(ScanConfig::parse("[reporting]\nformat = \"json\"\n"), "unknown field")
}

#[test]
fn unknown_formats_and_severities_are_rejected() -> TestResult {
    assert_invalid(ScanConfig::parse("[scanner]\nformat = \"xml\"\n"), "config parse error")?;
    assert_invalid(ScanConfig::parse("[scanner]\nseverity = \"severe\"\n"), "unknown severity")
}

#[test]
fn unknown_rule_ids_are_rejected() -> TestResult {
    assert_invalid(
        ScanConfig::parse("[rules]\nallow = [\"DAML-AUTH-999\"]\n"),
        "rules.allow names unknown rule DAML-AUTH-999",
    )?;
    assert_invalid(
        ScanConfig::parse("[rules]\ndeny = [\"NOT-A-RULE\"]\n"),
        "rules.deny names unknown rule NOT-A-RULE",
    )
}

#[test]
fn empty_allowlists_and_blank_ids_are_rejected() -> TestResult {
    assert_invalid(ScanConfig::parse("[rules]\nallow = []\n"), "rules.allow must not be empty")?;
    assert_invalid(ScanConfig::parse("[rules]\ndeny = [\"  \"]\n"), "entries must be non-empty")
}

#[test]
fn overlapping_allow_and_deny_are_rejected() -> TestResult {
    assert_invalid(
        ScanConfig::parse("[rules]\nallow = [\"DAML-KEY-001\"]\ndeny = [\" DAML-KEY-001 \"]\n"),
        "appears in both",
    )
}

#[test]
fn zero_limits_are_rejected() -> TestResult {
    assert_invalid(
        ScanConfig::parse("[limits]\nmax_entries = 0\n"),
        "limits.max_entries must be greater than zero",
    )
}

#[test]
fn limits_above_hard_caps_are_rejected() -> TestResult {
    assert_invalid(
        ScanConfig::parse("[limits]\nmax_compression_ratio = 1001\n"),
        "limits.max_compression_ratio exceeds hard cap",
    )?;
    let at_cap = ScanConfig::parse("[limits]\nmax_compression_ratio = 1000\n")
        .map_err(|err| err.to_string())?;
    if at_cap.limits.archive_limits().max_compression_ratio != 1000 {
        return Err("a limit equal to its cap should be accepted".to_string());
    }
    assert_invalid(
        ScanConfig::parse("[limits]\nmax_proto_depth = 1001\n"),
        "limits.max_proto_depth exceeds hard cap",
    )?;
    let depth_at_cap = ScanConfig::parse("[limits]\nmax_proto_depth = 1000\n")
        .map_err(|err| err.to_string())?;
    if depth_at_cap.limits.archive_limits().max_proto_depth != 1000 {
        return Err("the proto depth cap should be accepted".to_string());
    }
    Ok(())
}

#[test]
fn empty_paths_are_rejected() -> TestResult {
    assert_invalid(
        ScanConfig::parse("[suppressions]\npath = \"  \"\n"),
        "suppressions.path must be non-empty",
    )
}

#[test]
fn report_formats_parse_case_insensitively() -> TestResult {
    let parsed: ReportFormat = "BOTH".parse()?;
    if parsed != ReportFormat::Both || parsed.to_string() != "both" {
        return Err("format labels should round trip".to_string());
    }
    if "xml".parse::<ReportFormat>().is_ok() {
        return Err("xml should be rejected".to_string());
    }
    Ok(())
}
