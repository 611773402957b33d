// daml-sast-core/src/findings/fingerprint.rs
// ============================================================================
// Module: Finding Fingerprints
// Description: Stable SHA-256 identity of a finding.
// Purpose: Match findings against suppression files and baselines.
// Dependencies: serde, crate::digest
// ============================================================================

//! ## Overview
//! The fingerprint is the SHA-256 of the RFC 8785 canonical JSON of the rule
//! id, category, module, definition, optional location span, and the
//! structural keys of the evidence references. Structural keys exclude the
//! package id and node spans, so rebuilding a package with identical logic
//! keeps fingerprints stable; the location span is included when present.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::digest::ContentDigest;
use crate::digest::HashError;
use crate::findings::model::Category;
use crate::findings::model::Evidence;
use crate::ir::model::Location;
use crate::ir::model::SourceSpan;

// ============================================================================
// SECTION: Fingerprint Input
// ============================================================================

/// Canonical fingerprint payload.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    /// Rule id.
    rule_id: &'a str,
    /// Category label.
    category: Category,
    /// Module name.
    module: &'a str,
    /// Definition label.
    definition: &'a str,
    /// Location span, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<SourceSpan>,
    /// Structural keys of evidence references, in evidence order.
    evidence_refs: Vec<String>,
}

/// Computes the fingerprint of a finding's identifying parts.
///
/// # Errors
///
/// Returns [`HashError`] when canonical serialization fails.
pub fn fingerprint(
    rule_id: &str,
    category: Category,
    location: &Location,
    evidence: &[Evidence],
) -> Result<String, HashError> {
    let input = FingerprintInput {
        rule_id,
        category,
        module: &location.module,
        definition: &location.definition,
        span: location.span,
        evidence_refs: evidence
            .iter()
            .filter_map(|item| item.lf_ref.as_ref().map(crate::ir::model::LfRef::structural_key))
            .collect(),
    };
    Ok(ContentDigest::of_canonical_json(&input)?.into_string())
}
