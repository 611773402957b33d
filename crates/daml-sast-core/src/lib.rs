// daml-sast-core/src/lib.rs
// ============================================================================
// Module: Daml SAST Core
// Description: Static security analysis of compiled Daml-LF archives.
// Purpose: Decode DAR/DALF archives, lower them to an analysis IR, and run rules.
// Dependencies: prost, zip, globset, serde, serde_json, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! The pipeline runs strictly forward:
//!
//! 1. [`lf::read_dar`] opens the archive under hard resource limits;
//! 2. [`lf::DalfDecoder`] verifies, version-checks and decodes each package;
//! 3. [`ir::lower_package`] lowers raw Daml-LF into the analysis IR;
//! 4. [`engine::RuleEngine`] walks the IR and runs the selected rules;
//! 5. [`findings`] fingerprints, filters, suppresses and classifies.
//!
//! [`scan::scan_dar`] wires these stages together.
//!
//! Invariants:
//! - Archive bytes are untrusted; every size and structure limit is checked
//!   before the data is parsed further.
//! - The IR is immutable after lowering.
//! - Findings are heuristic. An empty report is not a proof of absence.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analysis;
pub mod digest;
pub mod engine;
pub mod error;
pub mod events;
pub mod findings;
pub mod ir;
pub mod lf;
pub mod rules;
pub mod scan;
pub mod walker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use digest::HashError;
pub use engine::EngineReport;
pub use engine::EngineState;
pub use engine::RuleEngine;
pub use error::HardeningLimit;
pub use error::RuleExecutionWarning;
pub use error::ScanError;
pub use events::FileEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::ScanEvent;
pub use events::ScanEventKind;
pub use events::ScanEventSink;
pub use events::StderrEventSink;
pub use findings::Finding;
pub use findings::Severity;
pub use rules::RULESET_VERSION;
pub use rules::RuleRegistry;
pub use rules::RuleSelection;
pub use scan::LoweringPolicy;
pub use scan::ScanOptions;
pub use scan::ScanReport;
pub use scan::scan_dar;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Version of this tool.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
