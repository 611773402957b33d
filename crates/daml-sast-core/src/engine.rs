// daml-sast-core/src/engine.rs
// ============================================================================
// Module: Rule Engine
// Description: Selects rules from a registry and runs them over a program.
// Purpose: Own the Registered -> Filtered -> Running -> Completed lifecycle.
// Dependencies: crate::rules, crate::walker
// ============================================================================

//! ## Overview
//! The engine borrows a [`RuleRegistry`], applies a [`RuleSelection`] once,
//! and walks programs with the selected rules. Output is in traversal order;
//! [`EngineReport::sorted`] applies the stable reporting order.
//!
//! The engine runs rules sequentially and holds no state between runs
//! beyond its selection, so repeated runs over the same program are
//! identical.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::RuleExecutionWarning;
use crate::findings::model::Finding;
use crate::findings::model::sort_findings;
use crate::ir::model::Program;
use crate::rules::base::Rule;
use crate::rules::registry::RegistryError;
use crate::rules::registry::RuleRegistry;
use crate::rules::registry::RuleSelection;
use crate::walker::walk_program;

// ============================================================================
// SECTION: State
// ============================================================================

/// Lifecycle state of a [`RuleEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Rules are registered; no selection applied.
    Registered,
    /// A selection has been applied.
    Filtered,
    /// A run is in progress.
    Running,
    /// The last run finished.
    Completed,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Output of one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineReport {
    /// Findings, fingerprinted.
    pub findings: Vec<Finding>,
    /// Rule hook failures.
    pub warnings: Vec<RuleExecutionWarning>,
}

impl EngineReport {
    /// Returns the report with findings in stable reporting order.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        sort_findings(&mut self.findings);
        self
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Runs a selection of rules over programs.
#[derive(Clone)]
pub struct RuleEngine<'r> {
    /// Source of rules.
    registry: &'r RuleRegistry,
    /// Selected rules in registry order.
    selected: Vec<&'r dyn Rule>,
    /// Current lifecycle state.
    state: EngineState,
}

impl<'r> RuleEngine<'r> {
    /// Creates an engine over a registry; no rule is selected yet.
    #[must_use]
    pub const fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            selected: Vec::new(),
            state: EngineState::Registered,
        }
    }

    /// Applies a selection.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownRule`] when the selection names an id
    /// the registry does not hold; the engine stays in its previous state.
    pub fn select(&mut self, selection: &RuleSelection) -> Result<(), RegistryError> {
        self.selected = self.registry.select(selection)?;
        self.state = EngineState::Filtered;
        Ok(())
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Returns the ids of the selected rules.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<&'static str> {
        self.selected.iter().map(|rule| rule.meta().id).collect()
    }

    /// Runs the selected rules over a program.
    ///
    /// An engine still in [`EngineState::Registered`] selects every rule
    /// first.
    #[must_use]
    pub fn run(&mut self, program: &Program) -> EngineReport {
        if self.state == EngineState::Registered {
            self.selected = self.registry.select(&RuleSelection::all()).unwrap_or_default();
        }
        self.state = EngineState::Running;
        let output = walk_program(program, &self.selected);
        self.state = EngineState::Completed;
        EngineReport {
            findings: output.findings,
            warnings: output.warnings,
        }
    }
}
