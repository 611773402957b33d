// daml-sast-config/src/lib.rs
// ============================================================================
// Module: Daml SAST Config Library
// Description: Configuration model and validation for the scanner.
// Purpose: Single source of truth for daml-sast.toml semantics.
// Dependencies: daml-sast-core, serde, toml
// ============================================================================

//! ## Overview
//! `daml-sast-config` loads `daml-sast.toml`, applies `DAML_SAST_MAX_*`
//! environment overrides, and validates the result before the scanner sees
//! it. Invalid configuration fails closed; the CLI reports it as a usage
//! error.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
