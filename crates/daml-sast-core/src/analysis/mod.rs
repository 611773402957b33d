// daml-sast-core/src/analysis/mod.rs
// ============================================================================
// Module: Analysis
// Description: Abstract interpretation helpers shared by rules.
// Purpose: Party-set inference and update summaries.
// Dependencies: crate::ir
// ============================================================================

//! ## Overview
//! Helpers here are pure functions over the IR; rules call them from their
//! hooks and never cache results across nodes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod party;
pub mod updates;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use party::PartySet;
pub use party::SubsetVerdict;
pub use party::infer_maintainers;
pub use party::infer_party_set;
pub use updates::UpdateOp;
pub use updates::UpdateOpKind;
pub use updates::collect_update_ops;
pub use updates::find_ledger_time;
