// crates/daml-sast-core/tests/determinism.rs
// ============================================================================
// Module: Determinism Tests
// Description: Stable output order and fingerprint stability across runs.
// Purpose: Prove reports are byte-identical regardless of rule order and
//          package identity.
// ============================================================================

//! ## Overview
//! Scans the same archive repeatedly, under a reversed rule registry and
//! under arbitrary registration orders, and rebuilds a package with a
//! different id to show fingerprints only track structure and source spans.

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

use common::PackageBuilder;
use daml_sast_core::NoopEventSink;
use daml_sast_core::RuleRegistry;
use daml_sast_core::ScanOptions;
use daml_sast_core::ScanReport;
use daml_sast_core::findings::Finding;
use daml_sast_core::lf::ProtoDalfDecoder;
use daml_sast_core::lf::proto;
use daml_sast_core::rules::Rule;
use daml_sast_core::rules::catalog::builtin_rules;
use daml_sast_core::scan_dar;
use proptest::prelude::*;

/// A package that trips several rules across two modules.
fn noisy_package(version: &str, signatory_line: Option<i32>) -> proto::Package {
    let mut builder = PackageBuilder::new().with_metadata("noisy", version);

    let parties = builder.party_list(&[]);
    let signatories = match signatory_line {
        Some(line) => common::located(parties, line),
        None => parties,
    };
    let observers = builder.party_list(&[]);
    let orphan = builder.template("Orphan", signatories, observers);
    builder.add_template("Main", orphan);

    let signatories = builder.party_list(&["Alice"]);
    let observers = builder.party_list(&[]);
    let mut asset = builder.template("Asset", signatories, observers);
    let controllers = builder.party_list(&["Mallory"]);
    let this = builder.var("this");
    let create = builder.create("Main", "Asset", this);
    asset.choices.push(builder.choice("Duplicate", false, controllers, create));
    let controllers = builder.var("arg");
    let receipt = builder.create("Main", "Receipt", PackageBuilder::unit());
    asset.choices.push(builder.choice("Issue", false, controllers, receipt));
    builder.add_template("Main", asset);

    let signatories = builder.party_list(&[]);
    let observers = builder.party_list(&[]);
    let lib = builder.template("Empty", signatories, observers);
    builder.add_template("Lib", lib);
    builder.build()
}

fn scan_with_registry(dar: &[u8], registry: &RuleRegistry) -> ScanReport {
    scan_dar(dar, &ScanOptions::default(), &ProtoDalfDecoder, registry, &NoopEventSink).unwrap()
}

fn scan_noisy(version: &str, signatory_line: Option<i32>) -> ScanReport {
    let dar = common::single_package_dar(&noisy_package(version, signatory_line), 1, "17");
    common::scan(&dar).unwrap()
}

/// Builds a registry holding the builtin rules in `order`, a permutation of
/// their catalog positions.
fn registry_in_order(order: &[usize]) -> RuleRegistry {
    let mut slots: Vec<Option<Box<dyn Rule>>> = builtin_rules().into_iter().map(Some).collect();
    let rules = order.iter().filter_map(|index| slots[*index].take()).collect();
    RuleRegistry::from_rules(rules).unwrap()
}

fn report_bytes(report: &ScanReport) -> Vec<u8> {
    serde_json::to_vec(&(&report.packages, &report.findings, &report.warnings)).unwrap()
}

fn fingerprints(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|finding| finding.fingerprint.as_str()).collect()
}

#[test]
fn repeated_scans_are_identical() {
    let dar = common::single_package_dar(&noisy_package("1.0.0", None), 1, "17");
    let first = common::scan(&dar).unwrap();
    let second = common::scan(&dar).unwrap();
    assert!(first.findings.len() >= 5);
    assert_eq!(first, second);
}

#[test]
fn rule_registration_order_does_not_change_the_report() {
    let dar = common::single_package_dar(&noisy_package("1.0.0", None), 1, "17");
    let forward = scan_with_registry(&dar, &RuleRegistry::builtin());
    let reversed_rules = builtin_rules().into_iter().rev().collect();
    let reversed = scan_with_registry(&dar, &RuleRegistry::from_rules(reversed_rules).unwrap());
    assert_eq!(forward.findings, reversed.findings);
}

#[test]
fn findings_are_sorted_by_location_then_rule() {
    let dar = common::single_package_dar(&noisy_package("1.0.0", None), 1, "17");
    let report = common::scan(&dar).unwrap();
    let keys: Vec<_> = report.findings.iter().map(Finding::sort_key).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(report.findings[0].location.module, "Lib");
}

#[test]
fn fingerprints_survive_a_package_id_change() {
    let first = scan_noisy("1.0.0", None);
    let second = scan_noisy("1.0.1", None);
    assert_ne!(first.packages[0].package_id, second.packages[0].package_id);
    assert_eq!(fingerprints(&first.findings), fingerprints(&second.findings));
}

#[test]
fn fingerprints_track_source_spans() {
    let first = scan_noisy("1.0.0", Some(3));
    let moved = scan_noisy("1.0.0", Some(9));
    let orphan = |report: &ScanReport| {
        report
            .findings
            .iter()
            .find(|finding| finding.location.definition == "Template Main.Orphan")
            .map(|finding| finding.fingerprint.clone())
            .unwrap()
    };
    assert_ne!(orphan(&first), orphan(&moved));
}

#[test]
fn every_fingerprint_is_lowercase_hex_sha256() {
    let dar = common::single_package_dar(&noisy_package("1.0.0", None), 2, "1");
    let report = common::scan(&dar).unwrap();
    for finding in &report.findings {
        assert_eq!(finding.fingerprint.len(), 64);
        assert!(finding.fingerprint.chars().all(|ch| matches!(ch, '0' ..= '9' | 'a' ..= 'f')));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_rule_registration_order_yields_identical_report_bytes(
        order in Just((0 .. builtin_rules().len()).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let dar = common::single_package_dar(&noisy_package("1.0.0", None), 1, "17");
        let expected = report_bytes(&scan_with_registry(&dar, &RuleRegistry::builtin()));
        let registry = registry_in_order(&order);
        prop_assert_eq!(registry.len(), order.len());
        let shuffled = report_bytes(&scan_with_registry(&dar, &registry));
        prop_assert_eq!(shuffled, expected);
    }
}
