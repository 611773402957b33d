// daml-sast-core/src/analysis/party.rs
// ============================================================================
// Module: Party-Set Inference
// Description: Conservative evaluation of party-valued expressions.
// Purpose: Give authorization rules a ternary view of who a party list holds.
// Dependencies: crate::ir
// ============================================================================

//! ## Overview
//! Inference is a small recursive pattern match, not a dataflow solve. It
//! understands party literals, list literals and conses, `let`-bound aliases
//! (by substitution), projections of known record and struct literals, and
//! `case` expressions whose scrutinee is a known constructor. Anything else
//! is [`PartySet::Unknown`].
//!
//! Subset checks are ternary: [`SubsetVerdict::True`] and
//! [`SubsetVerdict::False`] are only produced when both sides are literal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::ir::model::Expr;
use crate::ir::model::ExprKind;
use crate::ir::model::FieldExpr;
use crate::ir::model::Literal;
use crate::ir::model::Pattern;
use crate::ir::model::TemplateKey;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum substitution depth before inference gives up.
const MAX_INFERENCE_DEPTH: usize = 64;

// ============================================================================
// SECTION: Party Sets
// ============================================================================

/// Inferred set of parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartySet {
    /// Exactly these parties.
    Literal(BTreeSet<String>),
    /// Union with at least one side not fully known.
    Union(Box<PartySet>, Box<PartySet>),
    /// Inference gave up.
    Unknown,
}

/// Ternary subset verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetVerdict {
    /// Inclusion holds.
    True,
    /// Inclusion fails.
    False,
    /// At least one side is not fully known.
    Indeterminate,
}

impl PartySet {
    /// Returns the empty literal set.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Literal(BTreeSet::new())
    }

    /// Returns a literal set of the given parties.
    #[must_use]
    pub fn literal<I, S>(parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Literal(parties.into_iter().map(Into::into).collect())
    }

    /// Unions two sets, collapsing literal operands eagerly.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::Literal(mut left), Self::Literal(right)) => {
                left.extend(right);
                Self::Literal(left)
            }
            (Self::Unknown, Self::Unknown) => Self::Unknown,
            (left, right) => Self::Union(Box::new(left), Box::new(right)),
        }
    }

    /// Returns the parties when the set is fully known.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Literal(parties) => Some(parties),
            _ => None,
        }
    }

    /// Returns true when any part of the set is unknown.
    #[must_use]
    pub fn contains_unknown(&self) -> bool {
        match self {
            Self::Literal(_) => false,
            Self::Union(left, right) => left.contains_unknown() || right.contains_unknown(),
            Self::Unknown => true,
        }
    }

    /// Tests `self ⊆ other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> SubsetVerdict {
        match (self.as_literal(), other.as_literal()) {
            (Some(left), Some(right)) if left.is_subset(right) => SubsetVerdict::True,
            (Some(_), Some(_)) => SubsetVerdict::False,
            _ => SubsetVerdict::Indeterminate,
        }
    }
}

// ============================================================================
// SECTION: Inference
// ============================================================================

/// Infers the party set denoted by an expression.
#[must_use]
pub fn infer_party_set(expr: &Expr) -> PartySet {
    infer(expr, &[], 0)
}

/// Infers the maintainers of a contract key.
///
/// Maintainers are usually a function of the key; the key body is
/// substituted for its parameter before inference.
#[must_use]
pub fn infer_maintainers(key: &TemplateKey) -> PartySet {
    match &key.maintainers.kind {
        ExprKind::Abs {
            param,
            body,
            ..
        } => {
            let env = [Frame {
                name: param,
                bound: &key.body,
                scope: 0,
            }];
            infer(body, &env, 0)
        }
        _ => infer(&key.maintainers, &[], 0),
    }
}

/// A substitution: `name` denotes `bound` evaluated under the first `scope`
/// frames of the environment.
#[derive(Debug, Clone, Copy)]
struct Frame<'e> {
    /// Bound variable.
    name: &'e str,
    /// Bound expression.
    bound: &'e Expr,
    /// Environment prefix visible to `bound`.
    scope: usize,
}

/// Infers a party set under an environment.
fn infer<'e>(expr: &'e Expr, env: &[Frame<'e>], depth: usize) -> PartySet {
    if depth > MAX_INFERENCE_DEPTH {
        return PartySet::Unknown;
    }
    match &expr.kind {
        ExprKind::Lit(Literal::Party(party)) => PartySet::literal([party.as_str()]),
        ExprKind::List {
            items,
            ..
        } => items
            .iter()
            .fold(PartySet::empty(), |acc, item| acc.union(infer(item, env, depth + 1))),
        ExprKind::Cons {
            front,
            tail,
        } => front
            .iter()
            .fold(PartySet::empty(), |acc, item| acc.union(infer(item, env, depth + 1)))
            .union(infer(tail, env, depth + 1)),
        ExprKind::Var(name) => match lookup(env, name) {
            Some(frame) => infer(frame.bound, &env[.. frame.scope], depth + 1),
            None => PartySet::Unknown,
        },
        ExprKind::Let {
            bindings,
            body,
        } => {
            let mut local = env.to_vec();
            for binding in bindings {
                let scope = local.len();
                local.push(Frame {
                    name: &binding.name,
                    bound: &binding.bound,
                    scope,
                });
            }
            infer(body, &local, depth + 1)
        }
        ExprKind::RecProj {
            field,
            record: operand,
            ..
        }
        | ExprKind::StructProj {
            field,
            structure: operand,
        } => project(operand, field, env, depth),
        ExprKind::Case {
            scrutinee,
            alts,
        } => {
            let Some((value, scope)) = resolve(scrutinee, env, depth) else {
                return PartySet::Unknown;
            };
            let value_env = &env[.. scope];
            for alt in alts {
                match select(&alt.pattern, value) {
                    Selection::Skip => {}
                    Selection::Take(None) => return infer(&alt.body, env, depth + 1),
                    Selection::Take(Some((binder, payload))) => {
                        let mut local = env.to_vec();
                        local.push(Frame {
                            name: binder,
                            bound: payload,
                            scope: value_env.len(),
                        });
                        return infer(&alt.body, &local, depth + 1);
                    }
                    Selection::Unsupported => return PartySet::Unknown,
                }
            }
            PartySet::Unknown
        }
        _ => PartySet::Unknown,
    }
}

/// Infers a field projection of a known record or struct literal.
fn project<'e>(operand: &'e Expr, field: &str, env: &[Frame<'e>], depth: usize) -> PartySet {
    let Some((value, scope)) = resolve(operand, env, depth) else {
        return PartySet::Unknown;
    };
    let fields: &[FieldExpr] = match &value.kind {
        ExprKind::RecCon {
            fields,
            ..
        }
        | ExprKind::StructCon {
            fields,
        } => fields,
        _ => return PartySet::Unknown,
    };
    fields
        .iter()
        .find(|candidate| candidate.name == field)
        .map_or(PartySet::Unknown, |found| infer(&found.value, &env[.. scope], depth + 1))
}

/// Follows variable aliases; returns the target and its environment prefix.
fn resolve<'e>(expr: &'e Expr, env: &[Frame<'e>], depth: usize) -> Option<(&'e Expr, usize)> {
    let mut current = expr;
    let mut scope = env.len();
    for _ in depth .. MAX_INFERENCE_DEPTH {
        let ExprKind::Var(name) = &current.kind else {
            return Some((current, scope));
        };
        let frame = lookup(&env[.. scope], name)?;
        current = frame.bound;
        scope = frame.scope;
    }
    None
}

/// Returns the innermost frame binding a name.
fn lookup<'a, 'e>(env: &'a [Frame<'e>], name: &str) -> Option<&'a Frame<'e>> {
    env.iter().rev().find(|frame| frame.name == name)
}

/// How a case alternative relates to a known scrutinee.
enum Selection<'e> {
    /// The alternative does not match.
    Skip,
    /// The alternative matches, optionally binding a payload.
    Take(Option<(&'e str, &'e Expr)>),
    /// The alternative may match but its binders cannot be substituted.
    Unsupported,
}

/// Matches a pattern against a constructor expression.
fn select<'e>(pattern: &'e Pattern, value: &'e Expr) -> Selection<'e> {
    match (pattern, &value.kind) {
        (Pattern::Default, _) => Selection::Take(None),
        (Pattern::PrimCon(expected), ExprKind::PrimCon(actual)) => {
            take_if(expected == actual, None)
        }
        (
            Pattern::Variant {
                variant,
                binder,
                ..
            },
            ExprKind::VariantCon {
                variant: actual,
                arg,
                ..
            },
        ) => take_if(variant == actual, Some((binder.as_str(), arg.as_ref()))),
        (
            Pattern::Enum {
                constructor,
                ..
            },
            ExprKind::EnumCon {
                constructor: actual,
                ..
            },
        ) => take_if(constructor == actual, None),
        (Pattern::OptionalNone, ExprKind::OptionalNone) => Selection::Take(None),
        (
            Pattern::OptionalSome {
                binder,
            },
            ExprKind::OptionalSome(inner),
        ) => Selection::Take(Some((binder.as_str(), inner.as_ref()))),
        (
            Pattern::Nil,
            ExprKind::List {
                items,
                ..
            },
        ) => take_if(items.is_empty(), None),
        (
            Pattern::Cons {
                ..
            },
            ExprKind::List {
                items,
                ..
            },
        ) if items.is_empty() => Selection::Skip,
        (
            Pattern::Cons {
                ..
            },
            ExprKind::List {
                ..
            }
            | ExprKind::Cons {
                ..
            },
        ) => Selection::Unsupported,
        (
            _,
            ExprKind::PrimCon(_)
            | ExprKind::VariantCon {
                ..
            }
            | ExprKind::EnumCon {
                ..
            }
            | ExprKind::OptionalNone
            | ExprKind::OptionalSome(_)
            | ExprKind::List {
                ..
            },
        ) => Selection::Skip,
        _ => Selection::Unsupported,
    }
}

/// Returns `Take` when the condition holds, `Skip` otherwise.
const fn take_if<'e>(condition: bool, binding: Option<(&'e str, &'e Expr)>) -> Selection<'e> {
    if condition { Selection::Take(binding) } else { Selection::Skip }
}
