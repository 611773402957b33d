// daml-sast-core/src/ir/mod.rs
// ============================================================================
// Module: Analysis IR
// Description: IR model and lowering from decoded packages.
// Purpose: Group the analysis-facing program representation.
// Dependencies: crate::lf
// ============================================================================

//! ## Overview
//! [`lower::lower_package`] turns a decoded package into the [`model`] tree
//! that the walker and rules consume.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod lower;
pub mod model;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use lower::lower_package;
pub use lower::lower_program;
pub use model::Choice;
pub use model::Expr;
pub use model::ExprKind;
pub use model::LfRef;
pub use model::Location;
pub use model::Module;
pub use model::Package;
pub use model::Program;
pub use model::SourceSpan;
pub use model::Template;
pub use model::Type;
pub use model::UpdateExpr;
pub use model::ValueDef;
