// crates/daml-sast-core/tests/suppression.rs
// ============================================================================
// Module: Suppression Tests
// Description: Suppression file parsing and glob matching.
// Purpose: Pin the file format and prove applying a list is idempotent.
// ============================================================================

//! ## Overview
//! Parses suppression files with comments, quoted tokens, and trailing
//! wildcards, and checks matching against every finding field.

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

mod common;

use common::sample_finding;
use daml_sast_core::Severity;
use daml_sast_core::findings::Finding;
use daml_sast_core::findings::SuppressionError;
use daml_sast_core::findings::SuppressionList;
use daml_sast_core::findings::SuppressionRule;
use daml_sast_core::findings::suppress::MAX_SUPPRESSION_FILE_BYTES;
use proptest::prelude::*;

fn corpus() -> Vec<Finding> {
    vec![
        sample_finding("DAML-AUTH-001", "Main", "Choice Main.Iou:Transfer", Severity::Medium),
        sample_finding("DAML-AUTH-002", "Main", "Choice Main.Iou:Split", Severity::Medium),
        sample_finding("DAML-LIFE-001", "Main", "Choice Main.Iou:Mint", Severity::High),
        sample_finding("DAML-PRIV-001", "Lib.Util", "Template Lib.Util.Note", Severity::Medium),
    ]
}

fn ids(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|finding| finding.rule_id.as_str()).collect()
}

#[test]
fn empty_and_comment_only_files_suppress_nothing() {
    let list = SuppressionList::parse("\n# nothing here\n   \n").unwrap();
    assert!(list.is_empty());
    assert_eq!(list.apply(corpus()).len(), 4);
}

#[test]
fn rule_id_only_line_matches_every_location() {
    let list = SuppressionList::parse("DAML-AUTH-001\n").unwrap();
    assert_eq!(ids(&list.apply(corpus())), vec!["DAML-AUTH-002", "DAML-LIFE-001", "DAML-PRIV-001"]);
}

#[test]
fn rule_id_globs_match_families() {
    let list = SuppressionList::parse("DAML-AUTH-*   # whole family\n").unwrap();
    assert_eq!(ids(&list.apply(corpus())), vec!["DAML-LIFE-001", "DAML-PRIV-001"]);
}

#[test]
fn quoted_definitions_keep_their_spaces() {
    let text = r#"
# rule   module  definition                  fingerprint
*        Main    "Choice Main.Iou:Transfer"  *
*        *       "Choice Main.Iou:M*"
"#;
    let list = SuppressionList::parse(text).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(ids(&list.apply(corpus())), vec!["DAML-AUTH-002", "DAML-PRIV-001"]);
}

#[test]
fn module_globs_are_matched_against_the_module_field() {
    let list = SuppressionList::parse("* Lib.*\n").unwrap();
    assert_eq!(ids(&list.apply(corpus())), vec!["DAML-AUTH-001", "DAML-AUTH-002", "DAML-LIFE-001"]);
}

#[test]
fn fingerprints_suppress_exactly_one_finding() {
    let findings = corpus();
    let target = findings[2].fingerprint.clone();
    let list = SuppressionList::parse(&format!("* * * {target}\n")).unwrap();
    let kept = list.apply(findings);
    assert_eq!(kept.len(), 3);
    assert!(kept.iter().all(|finding| finding.fingerprint != target));
}

#[test]
fn hash_inside_quotes_is_not_a_comment() {
    let list = SuppressionList::parse("\"DAML-#-1\" Main\n").unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn too_many_fields_report_the_line() {
    let err = SuppressionList::parse("\nDAML-AUTH-001 Main Def fp extra\n").unwrap_err();
    match err {
        SuppressionError::Syntax {
            line,
            ..
        } => assert_eq!(line, 2),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn unterminated_quotes_are_rejected() {
    let err = SuppressionList::parse("DAML-AUTH-001 \"Main\n").unwrap_err();
    assert!(matches!(err, SuppressionError::Syntax { line: 1, .. }));
}

#[test]
fn invalid_globs_are_rejected() {
    let err = SuppressionList::parse("DAML-[AUTH\n").unwrap_err();
    assert!(matches!(err, SuppressionError::Pattern { .. }));
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suppressions.txt");
    std::fs::write(&path, "DAML-LIFE-*\n").unwrap();
    let list = SuppressionList::load(&path).unwrap();
    assert_eq!(ids(&list.apply(corpus())).len(), 3);

    let missing = SuppressionList::load(&dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(missing, SuppressionError::Io(_)));
}

#[test]
fn oversized_suppression_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suppressions.txt");
    let mut text = "DAML-LIFE-*\n".to_string();
    let padding = usize::try_from(MAX_SUPPRESSION_FILE_BYTES).unwrap() + 1 - text.len();
    text.push_str(&"#".repeat(padding));
    std::fs::write(&path, text).unwrap();
    match SuppressionList::load(&path).unwrap_err() {
        SuppressionError::Io(message) => assert!(message.contains("exceeds"), "{message}"),
        other => panic!("expected size rejection, got {other:?}"),
    }
}

#[test]
fn programmatic_rules_match_like_parsed_ones() {
    let rule = SuppressionRule::new("DAML-AUTH-00?", Some("Main"), None, None).unwrap();
    let list = SuppressionList::new(vec![rule]);
    let findings = corpus();
    assert!(list.is_suppressed(&findings[0]));
    assert!(list.is_suppressed(&findings[1]));
    assert!(!list.is_suppressed(&findings[2]));
}

fn patterns() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "DAML-AUTH-001",
        "DAML-AUTH-*",
        "DAML-*-001",
        "* Main",
        "* Lib.*",
        "* * \"Choice Main.Iou:*\"",
        "*",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn applying_a_list_twice_equals_applying_it_once(
        lines in prop::collection::vec(patterns(), 0 .. 4),
    ) {
        let list = SuppressionList::parse(&lines.join("\n")).unwrap();
        let once = list.apply(corpus());
        let twice = list.apply(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn kept_findings_are_an_ordered_subsequence(
        lines in prop::collection::vec(patterns(), 0 .. 4),
    ) {
        let list = SuppressionList::parse(&lines.join("\n")).unwrap();
        let all = corpus();
        let kept = list.apply(all.clone());
        let mut cursor = all.iter();
        for finding in &kept {
            prop_assert!(cursor.any(|candidate| candidate == finding));
            prop_assert!(!list.is_suppressed(finding));
        }
    }
}
