// daml-sast-core/src/analysis/updates.rs
// ============================================================================
// Module: Update Analysis
// Description: Ledger-operation collection and ledger-time reachability.
// Purpose: Summarize what a choice body does to the ledger.
// Dependencies: crate::ir, crate::walker
// ============================================================================

//! ## Overview
//! [`collect_update_ops`] lists the ledger operations of a subtree in
//! pre-order. It is purely syntactic: operations hidden behind top-level
//! value references are not followed.
//!
//! [`find_ledger_time`] answers a narrower question, whether ledger time can
//! be observed from an expression, and does follow value references through
//! the [`ProgramIndex`] (each value is visited at most once).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::ir::model::Expr;
use crate::ir::model::ExprKind;
use crate::ir::model::LfRef;
use crate::ir::model::UpdateExpr;
use crate::walker::ProgramIndex;

// ============================================================================
// SECTION: Update Operations
// ============================================================================

/// Kind of a ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UpdateOpKind {
    /// `create`.
    Create,
    /// `create` through an interface.
    CreateInterface,
    /// `exercise`.
    Exercise,
    /// `exercise_by_key`.
    ExerciseByKey,
    /// `exercise` through an interface.
    ExerciseInterface,
    /// Dynamic `exercise`.
    DynamicExercise,
    /// Soft `exercise`.
    SoftExercise,
    /// `fetch`.
    Fetch,
    /// Soft `fetch`.
    SoftFetch,
    /// `fetch` through an interface.
    FetchInterface,
    /// `lookup_by_key`.
    LookupByKey,
    /// `fetch_by_key`.
    FetchByKey,
    /// `get_time`.
    GetTime,
    /// Ledger-time comparison.
    LedgerTimeLt,
}

impl UpdateOpKind {
    /// Returns true for the exercise family.
    #[must_use]
    pub const fn is_exercise(self) -> bool {
        matches!(
            self,
            Self::Exercise
                | Self::ExerciseByKey
                | Self::ExerciseInterface
                | Self::DynamicExercise
                | Self::SoftExercise
        )
    }

    /// Returns true for contract creation.
    #[must_use]
    pub const fn is_create(self) -> bool {
        matches!(self, Self::Create | Self::CreateInterface)
    }
}

/// One ledger operation found in a subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOp {
    /// Operation kind.
    pub kind: UpdateOpKind,
    /// Target template or interface, when the operation names one.
    pub template: Option<String>,
    /// Exercised choice, for the exercise family.
    pub choice: Option<String>,
    /// Reference of the update node.
    pub lf_ref: LfRef,
}

/// Collects ledger operations in pre-order.
#[must_use]
pub fn collect_update_ops(expr: &Expr) -> Vec<UpdateOp> {
    let mut ops = Vec::new();
    let mut stack = vec![expr];
    while let Some(node) = stack.pop() {
        if let Some(update) = node.as_update()
            && let Some((kind, template, choice)) = classify(update)
        {
            ops.push(UpdateOp {
                kind,
                template: template.map(str::to_string),
                choice: choice.map(str::to_string),
                lf_ref: node.lf_ref.clone(),
            });
        }
        stack.extend(node.children().into_iter().rev());
    }
    ops
}

/// Maps an update node onto its operation kind and targets.
fn classify(update: &UpdateExpr) -> Option<(UpdateOpKind, Option<&str>, Option<&str>)> {
    let classified = match update {
        UpdateExpr::Create {
            template,
            ..
        } => (UpdateOpKind::Create, Some(template.as_str()), None),
        UpdateExpr::CreateInterface {
            interface,
            ..
        } => (UpdateOpKind::CreateInterface, Some(interface.as_str()), None),
        UpdateExpr::Exercise {
            template,
            choice,
            ..
        } => (UpdateOpKind::Exercise, Some(template.as_str()), Some(choice.as_str())),
        UpdateExpr::ExerciseByKey {
            template,
            choice,
            ..
        } => (UpdateOpKind::ExerciseByKey, Some(template.as_str()), Some(choice.as_str())),
        UpdateExpr::ExerciseInterface {
            interface,
            choice,
            ..
        } => (UpdateOpKind::ExerciseInterface, Some(interface.as_str()), Some(choice.as_str())),
        UpdateExpr::DynamicExercise {
            template,
            choice,
            ..
        } => (UpdateOpKind::DynamicExercise, Some(template.as_str()), Some(choice.as_str())),
        UpdateExpr::SoftExercise {
            template,
            choice,
            ..
        } => (UpdateOpKind::SoftExercise, Some(template.as_str()), Some(choice.as_str())),
        UpdateExpr::Fetch {
            template,
            ..
        } => (UpdateOpKind::Fetch, Some(template.as_str()), None),
        UpdateExpr::SoftFetch {
            template,
            ..
        } => (UpdateOpKind::SoftFetch, Some(template.as_str()), None),
        UpdateExpr::FetchInterface {
            interface,
            ..
        } => (UpdateOpKind::FetchInterface, Some(interface.as_str()), None),
        UpdateExpr::LookupByKey {
            template,
            ..
        } => (UpdateOpKind::LookupByKey, Some(template.as_str()), None),
        UpdateExpr::FetchByKey {
            template,
            ..
        } => (UpdateOpKind::FetchByKey, Some(template.as_str()), None),
        UpdateExpr::GetTime => (UpdateOpKind::GetTime, None, None),
        UpdateExpr::LedgerTimeLt(_) => (UpdateOpKind::LedgerTimeLt, None, None),
        UpdateExpr::Pure(_)
        | UpdateExpr::Block {
            ..
        }
        | UpdateExpr::EmbedExpr(_)
        | UpdateExpr::TryCatch {
            ..
        } => return None,
    };
    Some(classified)
}

// ============================================================================
// SECTION: Ledger Time
// ============================================================================

/// Returns the first ledger-time read reachable from `expr`.
///
/// Unqualified value references resolve within `package_id`. The returned
/// reference points at the `get_time` or ledger-time comparison node, which
/// may live in another definition.
#[must_use]
pub fn find_ledger_time(expr: &Expr, index: &ProgramIndex<'_>, package_id: &str) -> Option<LfRef> {
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut stack: Vec<(&Expr, String)> = vec![(expr, package_id.to_string())];
    while let Some((node, package)) = stack.pop() {
        match &node.kind {
            ExprKind::Update(update)
                if matches!(update.as_ref(), UpdateExpr::GetTime | UpdateExpr::LedgerTimeLt(_)) =>
            {
                return Some(node.lf_ref.clone());
            }
            ExprKind::Val(name) => {
                if let Some((key, value)) = index.resolve(&package, name)
                    && visited.insert(key.clone())
                {
                    let owner = value_package(&key).to_string();
                    stack.push((&value.body, owner));
                }
                continue;
            }
            _ => {}
        }
        for child in node.children().into_iter().rev() {
            stack.push((child, package.clone()));
        }
    }
    None
}

/// Returns the package component of an index key.
fn value_package(key: &str) -> &str {
    key.split_once(':').map_or(key, |(package, _)| package)
}
