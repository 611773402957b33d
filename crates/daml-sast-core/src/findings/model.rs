// daml-sast-core/src/findings/model.rs
// ============================================================================
// Module: Finding Model
// Description: Finding records, evidence, and rating enums.
// Purpose: Define the immutable output schema of a scan.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Finding`] is created once by a rule during traversal and never
//! mutated afterwards. Its fingerprint is computed at emission time from the
//! rule id, category, structural location, and evidence references.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::ir::model::LfRef;
use crate::ir::model::Location;

// ============================================================================
// SECTION: Ratings
// ============================================================================

/// Finding severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational or low impact.
    Low,
    /// Moderate impact.
    Medium,
    /// High impact.
    High,
    /// Critical impact.
    Critical,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Returns the uppercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown severity: {value}"))
    }
}

/// Confidence that a finding is a true positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    /// Heuristic match.
    Low,
    /// Likely match.
    Medium,
    /// Near-certain match.
    High,
}

impl Confidence {
    /// Returns the uppercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Authorization.
    Auth,
    /// Contract lifecycle.
    Lifecycle,
    /// Disclosure and divulgence.
    Privacy,
    /// Contract keys.
    Key,
    /// Replay determinism.
    Determinism,
}

impl Category {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Lifecycle => "lifecycle",
            Self::Privacy => "privacy",
            Self::Key => "key",
            Self::Determinism => "determinism",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// Supporting evidence for a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    /// Evidence class (`template`, `choice`, `key`, `update`, `expr`).
    pub kind: String,
    /// Short human note.
    pub note: String,
    /// Reference to the raw node the evidence points at.
    pub lf_ref: Option<LfRef>,
}

impl Evidence {
    /// Builds evidence pointing at a node.
    #[must_use]
    pub fn at(kind: &str, note: impl Into<String>, lf_ref: &LfRef) -> Self {
        Self {
            kind: kind.to_string(),
            note: note.into(),
            lf_ref: Some(lf_ref.clone()),
        }
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Rule id.
    #[serde(rename = "id")]
    pub rule_id: String,
    /// Rule title.
    pub title: String,
    /// Severity.
    pub severity: Severity,
    /// Confidence.
    pub confidence: Confidence,
    /// Category.
    pub category: Category,
    /// Human-readable message.
    pub message: String,
    /// Package the finding belongs to.
    pub package_id: String,
    /// Structural location.
    pub location: Location,
    /// Supporting evidence, in emission order.
    pub evidence: Vec<Evidence>,
    /// Related locations.
    pub related: Vec<Location>,
    /// Free-form metadata.
    pub metadata: BTreeMap<String, String>,
    /// Stable fingerprint.
    pub fingerprint: String,
}

impl Finding {
    /// Returns the key used for the stable output sort.
    #[must_use]
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (&self.package_id, &self.location.module, &self.location.definition, &self.rule_id)
    }
}

/// Sorts findings by package, module, definition, and rule id, keeping
/// emission order among equal keys.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
}
