// daml-sast-core/src/rules/mod.rs
// ============================================================================
// Module: Rules
// Description: Rule interface, registry, and the shipped catalog.
// Purpose: Group everything a check needs to plug into the engine.
// Dependencies: crate::walker, crate::analysis
// ============================================================================

//! ## Overview
//! [`RULESET_VERSION`] identifies the catalog. It changes whenever a rule is
//! added, removed, or changes what it reports, which invalidates baselines
//! written by an older catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod base;
pub mod catalog;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use base::Rule;
pub use base::RuleError;
pub use base::RuleMeta;
pub use registry::RegistryError;
pub use registry::RuleRegistry;
pub use registry::RuleSelection;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Version of the shipped rule catalog.
pub const RULESET_VERSION: &str = "2026.1";
