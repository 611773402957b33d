// daml-sast-cli/src/lib.rs
// ============================================================================
// Module: Daml SAST CLI Library
// Description: Report renderers shared by the CLI binary and its tests.
// Purpose: Keep output formats testable without spawning the binary.
// Dependencies: daml-sast-core, serde, serde_json, time
// ============================================================================

//! ## Overview
//! The `daml-sast` binary lives in `main.rs`; this library holds the report
//! renderers it uses so that they can be exercised directly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod report;
