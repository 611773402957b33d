// daml-sast-core/src/findings/baseline.rs
// ============================================================================
// Module: Baselines
// Description: Versioned fingerprint sets of accepted findings.
// Purpose: Hide known findings while failing open on stale baselines.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A baseline is a JSON object `{tool_version, rules_version, fingerprints}`.
//! Payloads without version metadata and legacy bare-array payloads are
//! rejected on load. When the baseline's `rules_version` differs from the
//! running catalog, nothing is suppressed and the mismatch is reported: a
//! stale baseline must never hide findings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::TOOL_VERSION;
use crate::findings::model::Finding;
use crate::findings::read_text_bounded;
use crate::rules::RULESET_VERSION;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum baseline file size in bytes.
pub const MAX_BASELINE_FILE_BYTES: u64 = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Baseline load and write failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BaselineError {
    /// The file could not be read or written.
    #[error("baseline io error: {0}")]
    Io(String),
    /// The payload is not valid baseline JSON.
    #[error("baseline parse error: {0}")]
    Parse(String),
    /// The payload is a legacy fingerprint array.
    #[error("legacy baseline format is unsupported; regenerate the baseline")]
    Legacy,
    /// The payload lacks `tool_version` or `rules_version`.
    #[error("baseline missing version metadata; regenerate the baseline")]
    MissingMetadata,
}

// ============================================================================
// SECTION: Baseline
// ============================================================================

/// Versioned set of accepted fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Baseline {
    /// Tool version that wrote the baseline.
    pub tool_version: String,
    /// Rule catalog version that produced the fingerprints.
    pub rules_version: String,
    /// Accepted fingerprints.
    pub fingerprints: BTreeSet<String>,
}

/// A baseline was produced by a different rule catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineVersionMismatch {
    /// Running catalog version.
    pub expected: String,
    /// Version recorded in the baseline.
    pub found: String,
}

/// Result of applying a baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineOutcome {
    /// Findings not covered by the baseline.
    pub findings: Vec<Finding>,
    /// Number of findings the baseline suppressed.
    pub suppressed: usize,
    /// Catalog mismatch; when set nothing was suppressed.
    pub mismatch: Option<BaselineVersionMismatch>,
}

impl Baseline {
    /// Builds a baseline of the given findings stamped with current versions.
    #[must_use]
    pub fn from_findings(findings: &[Finding]) -> Self {
        Self {
            tool_version: TOOL_VERSION.to_string(),
            rules_version: RULESET_VERSION.to_string(),
            fingerprints: findings.iter().map(|finding| finding.fingerprint.clone()).collect(),
        }
    }

    /// Parses baseline JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError`] for malformed, legacy, or unversioned payloads.
    pub fn parse(text: &str) -> Result<Self, BaselineError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| BaselineError::Parse(err.to_string()))?;
        match &value {
            Value::Array(_) => return Err(BaselineError::Legacy),
            Value::Object(map) => {
                if !map.contains_key("tool_version") || !map.contains_key("rules_version") {
                    return Err(BaselineError::MissingMetadata);
                }
            }
            _ => return Err(BaselineError::Parse("baseline must be a JSON object".to_string())),
        }
        serde_json::from_value(value).map_err(|err| BaselineError::Parse(err.to_string()))
    }

    /// Reads and parses a baseline file.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError`] when the file cannot be read, exceeds
    /// [`MAX_BASELINE_FILE_BYTES`], or cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        let text =
            read_text_bounded(path, MAX_BASELINE_FILE_BYTES).map_err(BaselineError::Io)?;
        Self::parse(&text)
    }

    /// Renders the baseline as pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError::Parse`] when serialization fails.
    pub fn to_json(&self) -> Result<String, BaselineError> {
        let mut text = serde_json::to_string_pretty(self)
            .map_err(|err| BaselineError::Parse(err.to_string()))?;
        text.push('\n');
        Ok(text)
    }

    /// Writes the baseline to a file.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError`] when serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), BaselineError> {
        let text = self.to_json()?;
        fs::write(path, text).map_err(|err| BaselineError::Io(format!("{}: {err}", path.display())))
    }

    /// Removes findings whose fingerprint the baseline accepts.
    ///
    /// A baseline from a different rule catalog suppresses nothing and
    /// reports the mismatch instead.
    #[must_use]
    pub fn apply(&self, findings: Vec<Finding>) -> BaselineOutcome {
        if self.rules_version != RULESET_VERSION {
            return BaselineOutcome {
                findings,
                suppressed: 0,
                mismatch: Some(BaselineVersionMismatch {
                    expected: RULESET_VERSION.to_string(),
                    found: self.rules_version.clone(),
                }),
            };
        }
        let total = findings.len();
        let kept: Vec<Finding> = findings
            .into_iter()
            .filter(|finding| !self.fingerprints.contains(&finding.fingerprint))
            .collect();
        BaselineOutcome {
            suppressed: total - kept.len(),
            findings: kept,
            mismatch: None,
        }
    }
}
