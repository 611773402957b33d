// daml-sast-core/src/findings/mod.rs
// ============================================================================
// Module: Findings
// Description: Finding schema, fingerprints, suppression, baselines, outcomes.
// Purpose: Everything that happens to a finding after a rule emits it.
// Dependencies: globset, serde, serde_json
// ============================================================================

//! ## Overview
//! Findings leave the engine fingerprinted and sorted; callers then filter by
//! severity, apply suppression files and baselines, and classify the outcome.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod baseline;
pub mod fingerprint;
pub mod model;
pub mod outcome;
pub mod suppress;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::lf::limits::len_u64;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use baseline::Baseline;
pub use baseline::BaselineError;
pub use baseline::BaselineOutcome;
pub use baseline::BaselineVersionMismatch;
pub use fingerprint::fingerprint;
pub use model::Category;
pub use model::Confidence;
pub use model::Evidence;
pub use model::Finding;
pub use model::Severity;
pub use model::sort_findings;
pub use outcome::ScanOutcome;
pub use outcome::filter_by_severity;
pub use suppress::SuppressionError;
pub use suppress::SuppressionList;
pub use suppress::SuppressionRule;

// ============================================================================
// SECTION: File Input
// ============================================================================

/// Reads a UTF-8 text file of at most `max_bytes` bytes.
///
/// The read stops one byte past the limit, so an oversized or growing file is
/// never buffered whole. Errors are rendered with the path.
pub(crate) fn read_text_bounded(path: &Path, max_bytes: u64) -> Result<String, String> {
    let file = File::open(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut text = String::new();
    file.take(max_bytes.saturating_add(1))
        .read_to_string(&mut text)
        .map_err(|err| format!("{}: {err}", path.display()))?;
    if len_u64(text.len()) > max_bytes {
        return Err(format!("{}: file exceeds {max_bytes} bytes", path.display()));
    }
    Ok(text)
}
