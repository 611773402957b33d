// daml-sast-core/src/rules/base.rs
// ============================================================================
// Module: Rule Interface
// Description: Rule metadata, the rule trait, and rule failures.
// Purpose: Define the seam every check plugs into.
// Dependencies: thiserror, crate::walker
// ============================================================================

//! ## Overview
//! A rule is a stateless value implementing [`Rule`]. The walker calls its
//! hooks in traversal order; each hook receives a read-only [`Ctx`] and an
//! [`Emitter`] bound to the rule. Hooks default to doing nothing.
//!
//! A hook that returns [`RuleError`] does not stop the scan: the failure is
//! recorded as a rule execution warning and traversal continues.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::digest::HashError;
use crate::findings::model::Category;
use crate::findings::model::Confidence;
use crate::findings::model::Severity;
use crate::ir::model::Choice;
use crate::ir::model::Expr;
use crate::ir::model::Module;
use crate::ir::model::Package;
use crate::ir::model::Template;
use crate::walker::Ctx;
use crate::walker::Emitter;

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Static description of a rule.
///
/// # Invariants
/// - `id` is unique within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMeta {
    /// Stable rule id, e.g. `DAML-AUTH-001`.
    pub id: &'static str,
    /// Short title.
    pub title: &'static str,
    /// One-sentence description.
    pub description: &'static str,
    /// Severity of emitted findings.
    pub severity: Severity,
    /// Confidence of emitted findings.
    pub confidence: Confidence,
    /// Category of emitted findings.
    pub category: Category,
    /// Free-form tags.
    pub tags: &'static [&'static str],
    /// Why the pattern is hazardous.
    pub rationale: &'static str,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure raised by a rule hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The rule could not evaluate a node.
    #[error("{0}")]
    Failed(String),
    /// A finding could not be fingerprinted.
    #[error("fingerprint failed: {0}")]
    Fingerprint(#[from] HashError),
}

// ============================================================================
// SECTION: Rule Trait
// ============================================================================

/// A pluggable check over the IR.
///
/// Rules must not keep state across hook calls; two runs over the same
/// program must emit the same findings in the same order.
pub trait Rule: Send + Sync {
    /// Returns the rule's metadata.
    fn meta(&self) -> &'static RuleMeta;

    /// Called once per package before its modules.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule cannot evaluate the package.
    fn visit_package(
        &self,
        _ctx: &Ctx<'_>,
        _package: &Package,
        _emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    /// Called once per module before its templates.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule cannot evaluate the module.
    fn visit_module(
        &self,
        _ctx: &Ctx<'_>,
        _module: &Module,
        _emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    /// Called once per template before its expressions.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule cannot evaluate the template.
    fn visit_template(
        &self,
        _ctx: &Ctx<'_>,
        _template: &Template,
        _emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    /// Called once per choice before its expressions.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule cannot evaluate the choice.
    fn visit_choice(
        &self,
        _ctx: &Ctx<'_>,
        _template: &Template,
        _choice: &Choice,
        _emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    /// Called for every expression node in pre-order.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule cannot evaluate the expression.
    fn visit_expr(
        &self,
        _ctx: &Ctx<'_>,
        _expr: &Expr,
        _emit: &mut Emitter<'_>,
    ) -> Result<(), RuleError> {
        Ok(())
    }
}
