// daml-sast-cli/src/report/mod.rs
// ============================================================================
// Module: Report Rendering
// Description: JSON, SARIF, and rule catalog output.
// Purpose: Turn filtered findings into stable machine-readable documents.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Both renderers take findings that are already filtered, suppressed, and
//! sorted; they never reorder or drop anything. Output is pretty-printed and
//! newline-terminated so it can be written to a file or stdout unchanged.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod json;
pub mod sarif;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report rendering failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization failed.
    #[error("report serialization failed: {0}")]
    Serialize(String),
    /// A timestamp could not be formatted.
    #[error("report timestamp formatting failed: {0}")]
    Timestamp(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Pretty-prints a value as JSON with a trailing newline.
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ReportError> {
    let mut text =
        serde_json::to_string_pretty(value).map_err(|err| ReportError::Serialize(err.to_string()))?;
    text.push('\n');
    Ok(text)
}
