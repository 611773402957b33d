// daml-sast-core/src/findings/outcome.rs
// ============================================================================
// Module: Scan Outcomes
// Description: Severity filtering and terminal outcome classification.
// Purpose: Map a finished scan onto the exit-code contract.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Outcomes map onto exit codes: no findings and findings below the failure
//! threshold both succeed (`0`), findings at or above the threshold fail
//! (`1`), usage and configuration errors are `2`, and scan errors are `3`.
//! Rule execution warnings never change the tier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::findings::model::Finding;
use crate::findings::model::Severity;

// ============================================================================
// SECTION: Filtering
// ============================================================================

/// Keeps findings whose severity is at least `minimum`.
#[must_use]
pub fn filter_by_severity(findings: Vec<Finding>, minimum: Severity) -> Vec<Finding> {
    findings.into_iter().filter(|finding| finding.severity >= minimum).collect()
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Terminal outcome of a scan invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The scan completed with no findings.
    SuccessNoFindings,
    /// Findings exist, all below the failure threshold.
    SuccessBelowThreshold,
    /// At least one finding is at or above the failure threshold.
    FindingsAtOrAboveThreshold,
    /// Invalid arguments or configuration.
    UsageError,
    /// Hardening, decode, version, or lowering failure.
    ScanError,
}

impl ScanOutcome {
    /// Classifies reported findings against an optional failure threshold.
    #[must_use]
    pub fn classify(findings: &[Finding], fail_on: Option<Severity>) -> Self {
        if findings.is_empty() {
            return Self::SuccessNoFindings;
        }
        match fail_on {
            Some(threshold) if findings.iter().any(|finding| finding.severity >= threshold) => {
                Self::FindingsAtOrAboveThreshold
            }
            _ => Self::SuccessBelowThreshold,
        }
    }

    /// Returns the process exit code of the outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::SuccessNoFindings | Self::SuccessBelowThreshold => 0,
            Self::FindingsAtOrAboveThreshold => 1,
            Self::UsageError => 2,
            Self::ScanError => 3,
        }
    }
}
