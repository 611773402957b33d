// daml-sast-core/src/rules/catalog/auth.rs
// ============================================================================
// Module: Authorization Rules
// Description: Controller, signatory, and forwarding checks.
// Purpose: Flag choices and templates whose authority is misaligned.
// Dependencies: crate::analysis
// ============================================================================

//! ## Overview
//! Controller and signatory checks run party-set inference and only report
//! definite verdicts, except `DAML-AUTH-002`, which exists to surface the
//! indeterminate case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::analysis::party::PartySet;
use crate::analysis::party::SubsetVerdict;
use crate::analysis::party::infer_maintainers;
use crate::analysis::party::infer_party_set;
use crate::analysis::updates::UpdateOpKind;
use crate::analysis::updates::collect_update_ops;
use crate::findings::model::Category;
use crate::findings::model::Confidence;
use crate::findings::model::Evidence;
use crate::findings::model::Severity;
use crate::ir::model::Choice;
use crate::ir::model::Template;
use crate::rules::base::Rule;
use crate::rules::base::RuleError;
use crate::rules::base::RuleMeta;
use crate::rules::catalog::choice_draft;
use crate::rules::catalog::choice_location;
use crate::rules::catalog::template_location;
use crate::walker::Ctx;
use crate::walker::Emitter;
use crate::walker::FindingDraft;

// ============================================================================
// SECTION: DAML-AUTH-001
// ============================================================================

/// Metadata of `DAML-AUTH-001`.
static CONTROLLER_ALIGNMENT: RuleMeta = RuleMeta {
    id: "DAML-AUTH-001",
    title: "Controller not aligned with signatories",
    description: "Choice controllers are not a subset of template signatories or key maintainers.",
    severity: Severity::Medium,
    confidence: Confidence::Medium,
    category: Category::Auth,
    tags: &["authorization"],
    rationale: "A controller who is neither signatory nor maintainer acts with authority the \
                contract's stakeholders never granted.",
};

/// Controllers definitely outside signatories and key maintainers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerAlignment;

impl Rule for ControllerAlignment {
    fn meta(&self) -> &'static RuleMeta {
        &CONTROLLER_ALIGNMENT
    }

    fn visit_choice(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        choice: &Choice,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let controllers = infer_party_set(&choice.controllers);
        if controllers.is_subset_of(&authority(template)) != SubsetVerdict::False {
            return Ok(());
        }
        let location = choice_location(ctx, template, choice, Some(&choice.controllers));
        emit.emit(
            choice_draft(
                "Choice controllers are not a subset of signatories/maintainers.",
                location,
                template,
                choice,
            )
            .with_evidence(Evidence::at(
                "choice",
                "controllers expression",
                &choice.controllers.lf_ref,
            )),
        )
    }
}

/// Signatories joined with key maintainers.
fn authority(template: &Template) -> PartySet {
    let signatories = infer_party_set(&template.signatories);
    match &template.key {
        Some(key) => signatories.union(infer_maintainers(key)),
        None => signatories,
    }
}

// ============================================================================
// SECTION: DAML-AUTH-002
// ============================================================================

/// Metadata of `DAML-AUTH-002`.
static UNCONTROLLED_CONTROLLERS: RuleMeta = RuleMeta {
    id: "DAML-AUTH-002",
    title: "Controllers derived from uncontrolled data",
    description: "Choice controllers cannot be traced to signatories, maintainers, or literals.",
    severity: Severity::Medium,
    confidence: Confidence::Low,
    category: Category::Auth,
    tags: &["authorization"],
    rationale: "Controllers computed from choice arguments or opaque values may let any \
                submitter satisfy the authorization check.",
};

/// Controllers whose provenance inference cannot establish.
#[derive(Debug, Clone, Copy, Default)]
pub struct UncontrolledControllers;

impl Rule for UncontrolledControllers {
    fn meta(&self) -> &'static RuleMeta {
        &UNCONTROLLED_CONTROLLERS
    }

    fn visit_choice(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        choice: &Choice,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        if !infer_party_set(&choice.controllers).contains_unknown() {
            return Ok(());
        }
        let location = choice_location(ctx, template, choice, Some(&choice.controllers));
        emit.emit(
            choice_draft(
                "Choice controllers derived from uncontrolled/unknown expression.",
                location,
                template,
                choice,
            )
            .with_evidence(Evidence::at(
                "choice",
                "controllers expression",
                &choice.controllers.lf_ref,
            )),
        )
    }
}

// ============================================================================
// SECTION: DAML-AUTH-003
// ============================================================================

/// Metadata of `DAML-AUTH-003`.
static MISSING_SIGNATORIES: RuleMeta = RuleMeta {
    id: "DAML-AUTH-003",
    title: "Template has no signatories",
    description: "Templates should declare at least one signatory.",
    severity: Severity::High,
    confidence: Confidence::Medium,
    category: Category::Auth,
    tags: &["authorization"],
    rationale: "Nobody authorizes a contract without signatories, so nobody is accountable for \
                its creation or archival.",
};

/// Signatories that infer to the empty set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingSignatories;

impl Rule for MissingSignatories {
    fn meta(&self) -> &'static RuleMeta {
        &MISSING_SIGNATORIES
    }

    fn visit_template(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let empty = infer_party_set(&template.signatories)
            .as_literal()
            .is_some_and(BTreeSet::is_empty);
        if !empty {
            return Ok(());
        }
        let location = template_location(ctx, template, Some(&template.signatories));
        emit.emit(
            FindingDraft::new("Template declares no signatories.", location)
                .with_metadata("template", template.name.as_str())
                .with_evidence(Evidence::at(
                    "template",
                    "signatories expression",
                    &template.signatories.lf_ref,
                )),
        )
    }
}

// ============================================================================
// SECTION: DAML-AUTH-004
// ============================================================================

/// Metadata of `DAML-AUTH-004`.
static EXERCISE_FORWARDING: RuleMeta = RuleMeta {
    id: "DAML-AUTH-004",
    title: "Nonconsuming choice forwards via exercise",
    description: "Nonconsuming choice forwards by exercising another choice without other ledger \
                  actions.",
    severity: Severity::Medium,
    confidence: Confidence::Low,
    category: Category::Auth,
    tags: &["authorization", "forwarding"],
    rationale: "A nonconsuming choice that only exercises lends the template's authority to its \
                controller repeatedly, with nothing recorded on the forwarding contract.",
};

/// Nonconsuming choices whose every ledger operation is an exercise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExerciseForwarding;

impl Rule for ExerciseForwarding {
    fn meta(&self) -> &'static RuleMeta {
        &EXERCISE_FORWARDING
    }

    fn visit_choice(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        choice: &Choice,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        if choice.consuming() {
            return Ok(());
        }
        let ops = collect_update_ops(&choice.update);
        let Some(first) = ops.first() else {
            return Ok(());
        };
        if !ops.iter().all(|op| UpdateOpKind::is_exercise(op.kind)) {
            return Ok(());
        }
        let location = choice_location(ctx, template, choice, Some(&choice.update));
        emit.emit(
            choice_draft(
                "Nonconsuming choice forwards by exercising another choice without checks.",
                location,
                template,
                choice,
            )
            .with_evidence(Evidence::at("update", "exercise forwarding", &first.lf_ref)),
        )
    }
}
