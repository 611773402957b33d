// daml-sast-core/src/rules/catalog/privacy.rs
// ============================================================================
// Module: Privacy Rules
// Description: Over-broad observer detection.
// Purpose: Flag observers taken wholesale from a party list.
// Dependencies: crate::ir
// ============================================================================

//! ## Overview
//! `DAML-PRIV-001` fires when observers are *directly* a variable or field
//! typed `List Party`. Any computation in between (a `filter`, a `let`, a
//! function call) is taken as deliberate curation and is not reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::findings::model::Category;
use crate::findings::model::Confidence;
use crate::findings::model::Evidence;
use crate::findings::model::Severity;
use crate::ir::model::Choice;
use crate::ir::model::Expr;
use crate::ir::model::ExprKind;
use crate::ir::model::Template;
use crate::ir::model::Type;
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
// SECTION: DAML-PRIV-001
// ============================================================================

/// Metadata of `DAML-PRIV-001`.
static BROAD_OBSERVERS: RuleMeta = RuleMeta {
    id: "DAML-PRIV-001",
    title: "Over-broad observers",
    description: "Observers taken directly from a party list variable may be too permissive.",
    severity: Severity::Medium,
    confidence: Confidence::Low,
    category: Category::Privacy,
    tags: &["privacy", "divulgence"],
    rationale: "Whoever fills the list sees the contract; an unfiltered list lets the \
                submitter choose its audience.",
};

/// Observers that are an unfiltered `List Party` reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct BroadObservers;

impl Rule for BroadObservers {
    fn meta(&self) -> &'static RuleMeta {
        &BROAD_OBSERVERS
    }

    fn visit_template(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        if !is_direct_party_list(&template.observers) {
            return Ok(());
        }
        let location = template_location(ctx, template, Some(&template.observers));
        emit.emit(
            FindingDraft::new(
                "Template observers derived directly from a party list variable.",
                location,
            )
            .with_metadata("template", template.name.as_str())
            .with_evidence(Evidence::at(
                "template",
                "observers expression",
                &template.observers.lf_ref,
            )),
        )
    }

    fn visit_choice(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        choice: &Choice,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let Some(observers) = choice.observers.as_ref().filter(|expr| is_direct_party_list(expr))
        else {
            return Ok(());
        };
        let location = choice_location(ctx, template, choice, Some(observers));
        emit.emit(
            choice_draft(
                "Choice observers derived directly from a party list variable.",
                location,
                template,
                choice,
            )
            .with_evidence(Evidence::at("choice", "observers expression", &observers.lf_ref)),
        )
    }
}

/// Returns true for a variable or field reference typed `List Party`.
fn is_direct_party_list(expr: &Expr) -> bool {
    let reference = matches!(
        expr.kind,
        ExprKind::Var(_)
            | ExprKind::RecProj {
                ..
            }
            | ExprKind::StructProj {
                ..
            }
    );
    reference && expr.typ.as_ref().is_some_and(Type::is_party_list)
}
