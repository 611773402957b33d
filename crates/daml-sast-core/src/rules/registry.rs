// daml-sast-core/src/rules/registry.rs
// ============================================================================
// Module: Rule Registry
// Description: Explicit, ordered rule registry with allow/deny selection.
// Purpose: Decide which rules run, without global registration state.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The registry is an ordinary value. [`RuleRegistry::builtin`] returns the
//! shipped catalog in a fixed order; callers may build their own with
//! [`RuleRegistry::from_rules`]. A [`RuleSelection`] filters the registry
//! by rule id: deny wins over allow, and naming an id the registry does not
//! hold is an error rather than a silent no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::rules::base::Rule;
use crate::rules::base::RuleMeta;
use crate::rules::catalog;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry construction and selection failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two rules share an id.
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),
    /// A selection names a rule the registry does not hold.
    #[error("unknown rule id: {0}")]
    UnknownRule(String),
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Allow/deny filter over rule ids.
///
/// # Invariants
/// - `deny` overrides `allow` when both name a rule.
/// - If `allow` is `None`, every rule runs unless denied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSelection {
    /// Optional allowlist of rule ids.
    pub allow: Option<BTreeSet<String>>,
    /// Denylist of rule ids.
    pub deny: BTreeSet<String>,
}

impl RuleSelection {
    /// Returns a selection that runs every rule.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            allow: None,
            deny: BTreeSet::new(),
        }
    }

    /// Returns true when the rule id passes the filter.
    #[must_use]
    pub fn is_selected(&self, rule_id: &str) -> bool {
        if self.deny.contains(rule_id) {
            return false;
        }
        self.allow.as_ref().is_none_or(|allow| allow.contains(rule_id))
    }

    /// Returns every id the selection names.
    fn named_ids(&self) -> impl Iterator<Item = &String> {
        self.allow.iter().flatten().chain(self.deny.iter())
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Ordered set of rules.
///
/// # Invariants
/// - Rule ids are unique.
/// - Iteration order is registration order.
pub struct RuleRegistry {
    /// Rules in registration order.
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Returns the shipped rule catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            rules: catalog::builtin_rules(),
        }
    }

    /// Builds a registry from rules, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRule`] when two rules share an id.
    pub fn from_rules(rules: Vec<Box<dyn Rule>>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.meta().id) {
                return Err(RegistryError::DuplicateRule(rule.meta().id.to_string()));
            }
        }
        Ok(Self {
            rules,
        })
    }

    /// Returns the metadata of every rule in registration order.
    pub fn metas(&self) -> impl Iterator<Item = &'static RuleMeta> + '_ {
        self.rules.iter().map(|rule| rule.meta())
    }

    /// Returns true when the registry holds a rule with this id.
    #[must_use]
    pub fn contains(&self, rule_id: &str) -> bool {
        self.metas().any(|meta| meta.id == rule_id)
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rules passing the selection, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownRule`] when the selection names an id
    /// the registry does not hold.
    pub fn select(&self, selection: &RuleSelection) -> Result<Vec<&dyn Rule>, RegistryError> {
        if let Some(unknown) = selection.named_ids().find(|id| !self.contains(id)) {
            return Err(RegistryError::UnknownRule(unknown.clone()));
        }
        Ok(self
            .rules
            .iter()
            .filter(|rule| selection.is_selected(rule.meta().id))
            .map(|rule| rule.as_ref())
            .collect())
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.metas().map(|meta| meta.id)).finish()
    }
}
