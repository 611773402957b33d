// daml-sast-core/src/rules/catalog/lifecycle.rs
// ============================================================================
// Module: Lifecycle Rules
// Description: Contract creation from nonconsuming choices.
// Purpose: Flag choices that can mint contracts without archiving anything.
// Dependencies: crate::analysis
// ============================================================================

//! ## Overview
//! Both rules inspect the creates of a nonconsuming choice body. A body that
//! creates only its own template is reported once, by `DAML-LIFE-001`;
//! `DAML-LIFE-002` reports bodies that create any other template.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::analysis::updates::UpdateOp;
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
use crate::walker::Ctx;
use crate::walker::Emitter;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the create operations of a nonconsuming choice.
fn nonconsuming_creates(choice: &Choice) -> Vec<UpdateOp> {
    if choice.consuming() {
        return Vec::new();
    }
    collect_update_ops(&choice.update)
        .into_iter()
        .filter(|op| UpdateOpKind::is_create(op.kind))
        .collect()
}

/// Returns true when a create targets the given template.
fn targets(op: &UpdateOp, template: &Template) -> bool {
    op.template.as_deref() == Some(template.name.as_str())
}

// ============================================================================
// SECTION: DAML-LIFE-001
// ============================================================================

/// Metadata of `DAML-LIFE-001`.
static SELF_CREATION: RuleMeta = RuleMeta {
    id: "DAML-LIFE-001",
    title: "Nonconsuming choice creates new contract",
    description: "Nonconsuming choices that create their own template can duplicate assets.",
    severity: Severity::High,
    confidence: Confidence::Medium,
    category: Category::Lifecycle,
    tags: &["lifecycle", "asset"],
    rationale: "Each exercise leaves the original contract active and adds a copy, so an asset \
                modelled by the template can be multiplied at will.",
};

/// Nonconsuming choices that create their own template.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfCreation;

impl Rule for SelfCreation {
    fn meta(&self) -> &'static RuleMeta {
        &SELF_CREATION
    }

    fn visit_choice(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        choice: &Choice,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let creates = nonconsuming_creates(choice);
        let Some(op) = creates.iter().find(|op| targets(op, template)) else {
            return Ok(());
        };
        let location = choice_location(ctx, template, choice, Some(&choice.update));
        emit.emit(
            choice_draft(
                "Nonconsuming choice creates a new contract of the same template.",
                location,
                template,
                choice,
            )
            .with_evidence(Evidence::at("update", "update.create of same template", &op.lf_ref)),
        )
    }
}

// ============================================================================
// SECTION: DAML-LIFE-002
// ============================================================================

/// Metadata of `DAML-LIFE-002`.
static CONTRACT_CREATION: RuleMeta = RuleMeta {
    id: "DAML-LIFE-002",
    title: "Nonconsuming choice creates contract",
    description: "Nonconsuming choices that create any contract can mint assets unintentionally.",
    severity: Severity::Medium,
    confidence: Confidence::Medium,
    category: Category::Lifecycle,
    tags: &["lifecycle", "asset"],
    rationale: "Creation from a choice that archives nothing should be deliberate; repeated \
                exercises create unbounded contracts.",
};

/// Nonconsuming choices that create a template other than their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractCreation;

impl Rule for ContractCreation {
    fn meta(&self) -> &'static RuleMeta {
        &CONTRACT_CREATION
    }

    fn visit_choice(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        choice: &Choice,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let creates = nonconsuming_creates(choice);
        let Some(op) = creates.iter().find(|op| !targets(op, template)) else {
            return Ok(());
        };
        let location = choice_location(ctx, template, choice, Some(&choice.update));
        let message = "Nonconsuming choice creates a contract.";
        let mut draft = choice_draft(message, location, template, choice)
            .with_evidence(Evidence::at("update", "update.create", &op.lf_ref));
        if let Some(created) = &op.template {
            draft = draft.with_metadata("created", created.as_str());
        }
        emit.emit(draft)
    }
}
