// daml-sast-core/src/rules/catalog/determinism.rs
// ============================================================================
// Module: Determinism Rules
// Description: Ledger time in authorization and key logic.
// Purpose: Flag authority or keys that depend on when a transaction runs.
// Dependencies: crate::analysis
// ============================================================================

//! ## Overview
//! `DAML-DET-001` checks the expressions that decide who may act or see a
//! contract: signatories, observers, the key body and maintainers, choice
//! controllers and choice observers. Top-level value references are
//! followed, so a helper that reads the ledger clock is found through its
//! call site. The definition that actually reads the clock is attached as a
//! related location.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::analysis::updates::find_ledger_time;
use crate::findings::model::Category;
use crate::findings::model::Confidence;
use crate::findings::model::Evidence;
use crate::findings::model::Severity;
use crate::ir::model::Choice;
use crate::ir::model::Expr;
use crate::ir::model::Location;
use crate::ir::model::Template;
use crate::rules::base::Rule;
use crate::rules::base::RuleError;
use crate::rules::base::RuleMeta;
use crate::rules::catalog::choice_location;
use crate::rules::catalog::template_location;
use crate::walker::Ctx;
use crate::walker::Emitter;
use crate::walker::FindingDraft;

// ============================================================================
// SECTION: DAML-DET-001
// ============================================================================

/// Metadata of `DAML-DET-001`.
static LEDGER_TIME_IN_AUTHORITY: RuleMeta = RuleMeta {
    id: "DAML-DET-001",
    title: "Ledger time used in authorization/key logic",
    description: "Ledger time is referenced in authorization or key logic.",
    severity: Severity::Low,
    confidence: Confidence::Low,
    category: Category::Determinism,
    tags: &["determinism"],
    rationale: "Parties or keys computed from the clock change between submission and \
                replay, which makes authorization brittle.",
};

/// Ledger-time reads reachable from authority or key expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerTimeInAuthority;

impl Rule for LedgerTimeInAuthority {
    fn meta(&self) -> &'static RuleMeta {
        &LEDGER_TIME_IN_AUTHORITY
    }

    fn visit_template(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let mut owners: Vec<(&str, &Expr)> = vec![
            ("template signatories", &template.signatories),
            ("template observers", &template.observers),
        ];
        if let Some(key) = &template.key {
            owners.push(("key body", &key.body));
            owners.push(("key maintainers", &key.maintainers));
        }
        for (owner, expr) in owners {
            let location = template_location(ctx, template, Some(expr));
            check(ctx, owner, expr, location, template, emit)?;
        }
        Ok(())
    }

    fn visit_choice(
        &self,
        ctx: &Ctx<'_>,
        template: &Template,
        choice: &Choice,
        emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        let mut owners: Vec<(&str, &Expr)> = vec![("choice controllers", &choice.controllers)];
        if let Some(observers) = &choice.observers {
            owners.push(("choice observers", observers));
        }
        for (owner, expr) in owners {
            let location = choice_location(ctx, template, choice, Some(expr));
            check(ctx, owner, expr, location, template, emit)?;
        }
        Ok(())
    }
}

/// Emits a finding when ledger time is reachable from `expr`.
fn check(
    ctx: &Ctx<'_>,
    owner: &str,
    expr: &Expr,
    location: Location,
    template: &Template,
    emit: &mut Emitter<'_>,
) -> Result<(), RuleError> {
    let Some(read) = find_ledger_time(expr, ctx.index(), ctx.package_id()) else {
        return Ok(());
    };
    let related = Location {
        module: read.module().to_string(),
        definition: read.definition().to_string(),
        span: read.span(),
    };
    emit.emit(
        FindingDraft::new(format!("Ledger time referenced in {owner} logic."), location)
            .with_metadata("owner", owner)
            .with_metadata("template", template.name.as_str())
            .with_evidence(Evidence::at("expr", format!("{owner} expression"), &expr.lf_ref))
            .with_related(related),
    )
}
