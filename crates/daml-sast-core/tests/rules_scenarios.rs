// crates/daml-sast-core/tests/rules_scenarios.rs
// ============================================================================
// Module: Rule Scenario Tests
// Description: End-to-end scans of small packages against the built-in rules.
// Purpose: Pin which rules fire, and which stay quiet, on canonical shapes.
// ============================================================================

//! ## Overview
//! Each test builds one package, wraps it in a DAR, scans it with the full
//! catalog, and asserts the exact set of rule ids reported.

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
use common::rule_ids;
use common::single_package_dar;
use daml_sast_core::ScanReport;
use daml_sast_core::Severity;
use daml_sast_core::findings::Confidence;
use daml_sast_core::lf::proto;

fn scan_package(package: &proto::Package) -> ScanReport {
    common::scan(&single_package_dar(package, 1, "17")).unwrap()
}

fn asset_with_choice(
    build: impl FnOnce(&mut PackageBuilder) -> proto::TemplateChoice,
) -> proto::Package {
    let mut builder = PackageBuilder::new();
    let signatories = builder.party_list(&["Alice"]);
    let observers = builder.party_list(&[]);
    let mut template = builder.template("Asset", signatories, observers);
    template.choices.push(build(&mut builder));
    builder.add_template("Main", template);
    builder.build()
}

#[test]
fn empty_signatories_report_only_missing_signatories() {
    let mut builder = PackageBuilder::new();
    let signatories = builder.party_list(&[]);
    let observers = builder.party_list(&[]);
    let template = builder.template("Orphan", signatories, observers);
    builder.add_template("Main", template);
    let report = scan_package(&builder.build());

    assert_eq!(rule_ids(&report), vec!["DAML-AUTH-003"]);
    let finding = &report.findings[0];
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.location.module, "Main");
    assert_eq!(finding.location.definition, "Template Main.Orphan");
    assert_eq!(finding.metadata.get("template").map(String::as_str), Some("Main.Orphan"));
    assert_eq!(finding.fingerprint.len(), 64);
}

#[test]
fn well_formed_template_reports_nothing() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.party_list(&["Alice"]);
        builder.choice("Archive", true, controllers, PackageBuilder::pure_unit())
    });
    let report = scan_package(&package);
    assert!(report.findings.is_empty(), "{:?}", rule_ids(&report));
    assert!(report.warnings.is_empty());
}

#[test]
fn nonconsuming_self_creation_reports_only_self_creation() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.party_list(&["Alice"]);
        let this = builder.var("this");
        let create = builder.create("Main", "Asset", this);
        builder.choice("Duplicate", false, controllers, create)
    });
    let report = scan_package(&package);
    assert_eq!(rule_ids(&report), vec!["DAML-LIFE-001"]);
    assert_eq!(report.findings[0].location.definition, "Choice Main.Asset:Duplicate");
    assert_eq!(report.findings[0].severity, Severity::High);
}

#[test]
fn nonconsuming_creation_of_another_template_reports_contract_creation() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.party_list(&["Alice"]);
        let create = builder.create("Main", "Receipt", PackageBuilder::unit());
        builder.choice("Issue", false, controllers, create)
    });
    let report = scan_package(&package);
    assert_eq!(rule_ids(&report), vec!["DAML-LIFE-002"]);
    let finding = &report.findings[0];
    assert_eq!(finding.metadata.get("created").map(String::as_str), Some("Main.Receipt"));
    assert_eq!(finding.metadata.get("choice").map(String::as_str), Some("Issue"));
}

#[test]
fn consuming_creation_is_not_reported() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.party_list(&["Alice"]);
        let this = builder.var("this");
        let create = builder.create("Main", "Asset", this);
        builder.choice("Move", true, controllers, create)
    });
    assert!(scan_package(&package).findings.is_empty());
}

#[test]
fn template_observers_from_a_party_list_field_are_broad() {
    let mut builder = PackageBuilder::new();
    builder.record(
        "Main",
        "Asset",
        vec![("parties", PackageBuilder::list_type(PackageBuilder::party_type()))],
    );
    let signatories = builder.party_list(&["Alice"]);
    let this = builder.var("this");
    let observers = builder.rec_proj("Main", "Asset", "parties", this);
    let template = builder.template("Asset", signatories, observers);
    builder.add_template("Main", template);
    let report = scan_package(&builder.build());

    assert_eq!(rule_ids(&report), vec!["DAML-PRIV-001"]);
    assert_eq!(report.findings[0].confidence, Confidence::Low);
}

#[test]
fn filtered_observers_are_not_broad() {
    let mut builder = PackageBuilder::new();
    builder.record(
        "Main",
        "Asset",
        vec![("parties", PackageBuilder::list_type(PackageBuilder::party_type()))],
    );
    let signatories = builder.party_list(&["Alice"]);
    let this = builder.var("this");
    let parties = builder.rec_proj("Main", "Asset", "parties", this);
    let filter = builder.val("Main", "approved");
    let observers = PackageBuilder::app(filter, vec![parties]);
    let template = builder.template("Asset", signatories, observers);
    builder.add_template("Main", template);
    assert!(scan_package(&builder.build()).findings.is_empty());
}

#[test]
fn choice_observers_from_a_party_list_field_are_broad() {
    let mut builder = PackageBuilder::new();
    builder.record(
        "Main",
        "Asset",
        vec![("viewers", PackageBuilder::list_type(PackageBuilder::party_type()))],
    );
    let signatories = builder.party_list(&["Alice"]);
    let observers = builder.party_list(&[]);
    let mut template = builder.template("Asset", signatories, observers);
    let controllers = builder.party_list(&["Alice"]);
    let mut choice = builder.choice("Show", true, controllers, PackageBuilder::pure_unit());
    let this = builder.var("this");
    choice.observers = Some(builder.rec_proj("Main", "Asset", "viewers", this));
    template.choices.push(choice);
    builder.add_template("Main", template);
    let report = scan_package(&builder.build());

    assert_eq!(rule_ids(&report), vec!["DAML-PRIV-001"]);
    assert_eq!(report.findings[0].location.definition, "Choice Main.Asset:Show");
}

#[test]
fn controllers_outside_signatories_are_misaligned() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.party_list(&["Mallory"]);
        builder.choice("Take", true, controllers, PackageBuilder::pure_unit())
    });
    let report = scan_package(&package);
    assert_eq!(rule_ids(&report), vec!["DAML-AUTH-001"]);
}

#[test]
fn key_maintainers_count_as_controller_authority() {
    let mut builder = PackageBuilder::new();
    let signatories = builder.party_list(&["Alice", "Bank"]);
    let observers = builder.party_list(&[]);
    let mut template = builder.template("Account", signatories, observers);
    let key_type = PackageBuilder::list_type(PackageBuilder::party_type());
    let body = builder.party_list(&["Bank"]);
    let key_var = builder.var("k");
    let maintainers = builder.lambda("k", key_type.clone(), key_var);
    template.key = Some(PackageBuilder::key(key_type, body, maintainers));
    let controllers = builder.party_list(&["Bank"]);
    template
        .choices
        .push(builder.choice("Close", true, controllers, PackageBuilder::pure_unit()));
    builder.add_template("Main", template);
    assert!(scan_package(&builder.build()).findings.is_empty());
}

#[test]
fn controllers_from_the_choice_argument_are_uncontrolled() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.var("arg");
        builder.choice("Claim", true, controllers, PackageBuilder::pure_unit())
    });
    let report = scan_package(&package);
    assert_eq!(rule_ids(&report), vec!["DAML-AUTH-002"]);
    assert_eq!(report.findings[0].confidence, Confidence::Low);
}

#[test]
fn partially_known_controllers_are_uncontrolled_but_not_misaligned() {
    let package = asset_with_choice(|builder| {
        let head = builder.party("Mallory");
        let tail = builder.var("arg");
        let controllers = common::expr(proto::expr::Sum::Cons(proto::Cons {
            typ: Some(PackageBuilder::party_type()),
            front: vec![head],
            tail: Some(Box::new(tail)),
        }));
        builder.choice("Claim", true, controllers, PackageBuilder::pure_unit())
    });
    assert_eq!(rule_ids(&scan_package(&package)), vec!["DAML-AUTH-002"]);
}

#[test]
fn nonconsuming_exercise_only_choice_is_forwarding() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.party_list(&["Alice"]);
        let cid = builder.var("self");
        let exercise = builder.exercise("Main", "Vault", "Withdraw", cid, PackageBuilder::unit());
        builder.choice("Forward", false, controllers, exercise)
    });
    let report = scan_package(&package);
    assert_eq!(rule_ids(&report), vec!["DAML-AUTH-004"]);
}

#[test]
fn forwarding_with_other_ledger_actions_is_not_reported() {
    let package = asset_with_choice(|builder| {
        let controllers = builder.party_list(&["Alice"]);
        let fetch_cid = builder.var("self");
        let fetch = builder.fetch("Main", "Asset", fetch_cid);
        let cid = builder.var("self");
        let exercise = builder.exercise("Main", "Vault", "Withdraw", cid, PackageBuilder::unit());
        let body = builder.update_block(vec![fetch], exercise);
        builder.choice("Forward", false, controllers, body)
    });
    assert!(scan_package(&package).findings.is_empty());
}

#[test]
fn maintainers_outside_signatories_are_reported() {
    let mut builder = PackageBuilder::new();
    let signatories = builder.party_list(&["Alice"]);
    let observers = builder.party_list(&[]);
    let mut template = builder.template("Keyed", signatories, observers);
    let key_type = PackageBuilder::list_type(PackageBuilder::party_type());
    let body = builder.party_list(&["Bob"]);
    let key_var = builder.var("k");
    let maintainers = builder.lambda("k", key_type.clone(), key_var);
    template.key = Some(PackageBuilder::key(key_type, body, maintainers));
    builder.add_template("Main", template);
    let report = scan_package(&builder.build());
    assert_eq!(rule_ids(&report), vec!["DAML-KEY-001"]);
}

#[test]
fn ledger_time_behind_a_value_reference_is_reported() {
    let mut builder = PackageBuilder::new();
    let timestamp = common::prim_type(proto::PrimType::Timestamp, vec![]);
    let time_type = common::prim_type(proto::PrimType::Update, vec![timestamp]);
    builder.add_value("Main", "clockParties", time_type, PackageBuilder::get_time());
    let signatories = builder.val("Main", "clockParties");
    let observers = builder.party_list(&[]);
    let template = builder.template("Timed", signatories, observers);
    builder.add_template("Main", template);
    let report = scan_package(&builder.build());

    assert_eq!(rule_ids(&report), vec!["DAML-DET-001"]);
    let finding = &report.findings[0];
    assert_eq!(finding.metadata.get("owner").map(String::as_str), Some("template signatories"));
    assert_eq!(finding.related.len(), 1);
    assert_eq!(finding.related[0].definition, "Value Main.clockParties");
}

#[test]
fn ledger_time_in_controllers_is_reported_at_the_choice() {
    let package = asset_with_choice(|builder| {
        let controllers = PackageBuilder::get_time();
        builder.choice("Tick", true, controllers, PackageBuilder::pure_unit())
    });
    let report = scan_package(&package);
    let det: Vec<_> =
        report.findings.iter().filter(|finding| finding.rule_id == "DAML-DET-001").collect();
    assert_eq!(det.len(), 1);
    assert_eq!(det[0].location.definition, "Choice Main.Asset:Tick");
}

#[test]
fn findings_are_reported_for_every_package_in_the_archive() {
    let mut first = PackageBuilder::new().with_metadata("first", "1.0.0");
    let signatories = first.party_list(&[]);
    let observers = first.party_list(&[]);
    let template = first.template("Orphan", signatories, observers);
    first.add_template("Main", template);

    let mut second = PackageBuilder::new().with_metadata("second", "1.0.0");
    let signatories = second.party_list(&[]);
    let observers = second.party_list(&[]);
    let template = second.template("Orphan", signatories, observers);
    second.add_template("Other", template);

    let dar = common::write_dar(
        &[
            ("first.dalf", common::encode_dalf(&first.build(), 1, "17")),
            ("second.dalf", common::encode_dalf(&second.build(), 2, "1")),
        ],
        None,
    );
    let report = common::scan(&dar).unwrap();
    assert_eq!(report.packages.len(), 2);
    assert_eq!(rule_ids(&report), vec!["DAML-AUTH-003", "DAML-AUTH-003"]);
    let mut packages: Vec<&str> =
        report.findings.iter().map(|finding| finding.package_id.as_str()).collect();
    packages.dedup();
    assert_eq!(packages.len(), 2);
}
