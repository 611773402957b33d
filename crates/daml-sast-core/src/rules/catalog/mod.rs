// daml-sast-core/src/rules/catalog/mod.rs
// ============================================================================
// Module: Rule Catalog
// Description: The shipped security rules.
// Purpose: Register built-in checks in a fixed order.
// Dependencies: crate::analysis, crate::walker
// ============================================================================

//! ## Overview
//! | Id | Severity | Confidence | Check |
//! |---|---|---|---|
//! | `DAML-AUTH-001` | MEDIUM | MEDIUM | controllers outside signatories and maintainers |
//! | `DAML-AUTH-002` | MEDIUM | LOW | controllers of unknown provenance |
//! | `DAML-AUTH-003` | HIGH | MEDIUM | template with no signatories |
//! | `DAML-AUTH-004` | MEDIUM | LOW | nonconsuming choice that only exercises |
//! | `DAML-LIFE-001` | HIGH | MEDIUM | nonconsuming choice creates its own template |
//! | `DAML-LIFE-002` | MEDIUM | MEDIUM | nonconsuming choice creates another template |
//! | `DAML-PRIV-001` | MEDIUM | LOW | observers are an unfiltered party list |
//! | `DAML-KEY-001` | MEDIUM | MEDIUM | maintainers definitely outside signatories |
//! | `DAML-DET-001` | LOW | LOW | ledger time in authorization or key logic |

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod determinism;
pub mod keys;
pub mod lifecycle;
pub mod privacy;

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::ir::model::Choice;
use crate::ir::model::Expr;
use crate::ir::model::Location;
use crate::ir::model::Template;
use crate::ir::model::choice_label;
use crate::ir::model::template_label;
use crate::rules::base::Rule;
use crate::walker::Ctx;
use crate::walker::FindingDraft;

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Returns the built-in rules in catalog order.
#[must_use]
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(auth::ControllerAlignment),
        Box::new(auth::UncontrolledControllers),
        Box::new(auth::MissingSignatories),
        Box::new(auth::ExerciseForwarding),
        Box::new(lifecycle::SelfCreation),
        Box::new(lifecycle::ContractCreation),
        Box::new(privacy::BroadObservers),
        Box::new(keys::MaintainerAlignment),
        Box::new(determinism::LedgerTimeInAuthority),
    ]
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Locates a template finding at `expr`, falling back to the template span.
fn template_location(ctx: &Ctx<'_>, template: &Template, expr: Option<&Expr>) -> Location {
    let fallback = template.location.as_ref().and_then(|location| location.span);
    ctx.location(template_label(&template.name), expr.and_then(|expr| expr.span).or(fallback))
}

/// Locates a choice finding at `expr`, falling back to the choice span.
fn choice_location(
    ctx: &Ctx<'_>,
    template: &Template,
    choice: &Choice,
    expr: Option<&Expr>,
) -> Location {
    let fallback = choice.location.as_ref().and_then(|location| location.span);
    ctx.location(
        choice_label(&template.name, &choice.name),
        expr.and_then(|expr| expr.span).or(fallback),
    )
}

/// Starts a choice finding tagged with its template and choice.
fn choice_draft(
    message: &str,
    location: Location,
    template: &Template,
    choice: &Choice,
) -> FindingDraft {
    FindingDraft::new(message, location)
        .with_metadata("template", template.name.as_str())
        .with_metadata("choice", choice.name.as_str())
}
