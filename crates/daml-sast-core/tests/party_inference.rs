// crates/daml-sast-core/tests/party_inference.rs
// ============================================================================
// Module: Party-Set Inference Tests
// Description: Inference over lowered expressions and the subset law.
// Purpose: Pin the ternary semantics authorization rules depend on.
// ============================================================================

//! ## Overview
//! Expressions are built as raw Daml-LF, lowered through the real pipeline,
//! and inferred from the template signatories slot. Property tests pin the
//! subset law: literal operands decide, any unknown operand abstains.

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

use std::collections::BTreeSet;

use common::PackageBuilder;
use daml_sast_core::analysis::PartySet;
use daml_sast_core::analysis::SubsetVerdict;
use daml_sast_core::analysis::infer_maintainers;
use daml_sast_core::analysis::infer_party_set;
use daml_sast_core::ir::Template;
use daml_sast_core::lf::proto;
use proptest::prelude::*;

fn lowered_template(build: impl FnOnce(&mut PackageBuilder) -> proto::DefTemplate) -> Template {
    let mut builder = PackageBuilder::new();
    builder.record(
        "Main",
        "Holders",
        vec![("parties", PackageBuilder::list_type(PackageBuilder::party_type()))],
    );
    let template = build(&mut builder);
    builder.add_template("Main", template);
    let package = common::lower_one(&builder.build(), 1, "17").unwrap();
    package.modules[0].templates[0].clone()
}

fn infer_signatories(build: impl FnOnce(&mut PackageBuilder) -> proto::Expr) -> PartySet {
    let template = lowered_template(|builder| {
        let signatories = build(builder);
        let observers = builder.party_list(&[]);
        builder.template("Subject", signatories, observers)
    });
    infer_party_set(&template.signatories)
}

fn literal(parties: &[&str]) -> PartySet {
    PartySet::literal(parties.iter().copied())
}

#[test]
fn party_list_literal_is_known() {
    let set = infer_signatories(|builder| builder.party_list(&["Alice", "Bob", "Alice"]));
    assert_eq!(set, literal(&["Alice", "Bob"]));
}

#[test]
fn empty_list_is_the_empty_set() {
    let set = infer_signatories(|builder| builder.party_list(&[]));
    assert_eq!(set, PartySet::empty());
    assert_eq!(set.as_literal().map(BTreeSet::len), Some(0));
}

#[test]
fn let_bound_alias_is_substituted() {
    let set = infer_signatories(|builder| {
        let bound = builder.party_list(&["Alice"]);
        let owners = builder.var("owners");
        let alias_body = builder.var("alias");
        let alias = builder.let_in("alias", owners, alias_body);
        builder.let_in("owners", bound, alias)
    });
    assert_eq!(set, literal(&["Alice"]));
}

#[test]
fn shadowed_binder_uses_the_innermost_binding() {
    let set = infer_signatories(|builder| {
        let outer = builder.party_list(&["Alice"]);
        let inner = builder.party_list(&["Bob"]);
        let body = builder.var("ps");
        let shadow = builder.let_in("ps", inner, body);
        builder.let_in("ps", outer, shadow)
    });
    assert_eq!(set, literal(&["Bob"]));
}

#[test]
fn case_on_a_known_boolean_takes_the_matching_branch() {
    let set = infer_signatories(|builder| {
        let when_true = builder.party_list(&["Alice"]);
        let otherwise = builder.party_list(&["Bob"]);
        PackageBuilder::if_then_else(PackageBuilder::bool_con(true), when_true, otherwise)
    });
    assert_eq!(set, literal(&["Alice"]));

    let set = infer_signatories(|builder| {
        let when_true = builder.party_list(&["Alice"]);
        let otherwise = builder.party_list(&["Bob"]);
        PackageBuilder::if_then_else(PackageBuilder::bool_con(false), when_true, otherwise)
    });
    assert_eq!(set, literal(&["Bob"]));
}

#[test]
fn case_on_an_unknown_scrutinee_is_unknown() {
    let set = infer_signatories(|builder| {
        let scrutinee = builder.var("this");
        let when_true = builder.party_list(&["Alice"]);
        let otherwise = builder.party_list(&["Alice"]);
        PackageBuilder::if_then_else(scrutinee, when_true, otherwise)
    });
    assert_eq!(set, PartySet::Unknown);
}

#[test]
fn projection_of_a_record_literal_is_known() {
    let set = infer_signatories(|builder| {
        let parties = builder.party_list(&["Carol"]);
        let record = builder.rec_con("Main", "Holders", vec![("parties", parties)]);
        builder.rec_proj("Main", "Holders", "parties", record)
    });
    assert_eq!(set, literal(&["Carol"]));
}

#[test]
fn projection_of_the_contract_argument_is_unknown() {
    let set = infer_signatories(|builder| {
        let this = builder.var("this");
        builder.rec_proj("Main", "Subject", "owners", this)
    });
    assert_eq!(set, PartySet::Unknown);
}

#[test]
fn cons_onto_an_unknown_tail_is_a_partial_union() {
    let set = infer_signatories(|builder| {
        let head = builder.party("Alice");
        let tail = builder.var("this");
        common::expr(proto::expr::Sum::Cons(proto::Cons {
            typ: Some(PackageBuilder::party_type()),
            front: vec![head],
            tail: Some(Box::new(tail)),
        }))
    });
    assert!(set.contains_unknown());
    assert!(set.as_literal().is_none());
    assert_eq!(set.is_subset_of(&literal(&["Alice"])), SubsetVerdict::Indeterminate);
}

#[test]
fn application_is_unknown() {
    let set = infer_signatories(|builder| {
        let fun = builder.val("Main", "owners");
        let arg = builder.var("this");
        PackageBuilder::app(fun, vec![arg])
    });
    assert_eq!(set, PartySet::Unknown);
}

#[test]
fn maintainer_function_is_applied_to_the_key_body() {
    let template = lowered_template(|builder| {
        let signatories = builder.party_list(&["Alice"]);
        let observers = builder.party_list(&[]);
        let mut template = builder.template("Keyed", signatories, observers);
        let body = builder.party_list(&["Alice", "Bob"]);
        let key_var = builder.var("k");
        let key_type = PackageBuilder::list_type(PackageBuilder::party_type());
        let maintainers = builder.lambda("k", key_type.clone(), key_var);
        template.key = Some(PackageBuilder::key(key_type, body, maintainers));
        template
    });
    let key = template.key.as_ref().unwrap();
    assert_eq!(infer_maintainers(key), literal(&["Alice", "Bob"]));
}

#[test]
fn union_collapses_literals_and_unknowns() {
    assert_eq!(literal(&["A"]).union(literal(&["B"])), literal(&["A", "B"]));
    assert_eq!(PartySet::Unknown.union(PartySet::Unknown), PartySet::Unknown);
    let partial = literal(&["A"]).union(PartySet::Unknown);
    assert!(matches!(partial, PartySet::Union(_, _)));
    assert!(partial.contains_unknown());
}

fn party_names() -> impl Strategy<Value = BTreeSet<String>> {
    let names = prop::sample::select(vec!["Alice", "Bob", "Carol", "Dave", "Eve"]);
    prop::collection::btree_set(names, 0 .. 5)
        .prop_map(|names| names.into_iter().map(str::to_string).collect())
}

fn unknownish() -> impl Strategy<Value = PartySet> {
    prop_oneof![
        Just(PartySet::Unknown),
        party_names().prop_map(|names| PartySet::Literal(names).union(PartySet::Unknown)),
        party_names().prop_map(|names| PartySet::Unknown.union(PartySet::Literal(names))),
    ]
}

proptest! {
    #[test]
    fn literal_subset_matches_plain_set_inclusion(left in party_names(), right in party_names()) {
        let expected =
            if left.is_subset(&right) { SubsetVerdict::True } else { SubsetVerdict::False };
        let verdict = PartySet::Literal(left).is_subset_of(&PartySet::Literal(right));
        prop_assert_eq!(verdict, expected);
    }

    #[test]
    fn any_unknown_operand_is_indeterminate(known in party_names(), unknown in unknownish()) {
        let known = PartySet::Literal(known);
        prop_assert_eq!(known.is_subset_of(&unknown), SubsetVerdict::Indeterminate);
        prop_assert_eq!(unknown.is_subset_of(&known), SubsetVerdict::Indeterminate);
        prop_assert_eq!(unknown.is_subset_of(&unknown), SubsetVerdict::Indeterminate);
    }

    #[test]
    fn union_of_literals_is_set_union(left in party_names(), right in party_names()) {
        let expected: BTreeSet<String> = left.union(&right).cloned().collect();
        let merged = PartySet::Literal(left).union(PartySet::Literal(right));
        prop_assert_eq!(merged, PartySet::Literal(expected));
    }
}
