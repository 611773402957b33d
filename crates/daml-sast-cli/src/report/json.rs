// daml-sast-cli/src/report/json.rs
// ============================================================================
// Module: JSON Report
// Description: Finding list and rule catalog JSON documents.
// Purpose: Emit the native report format consumed by baselines and CI tools.
// Dependencies: daml-sast-core, serde
// ============================================================================

//! ## Overview
//! The findings report is a bare JSON array of [`Finding`] values in their
//! canonical serialized shape. The rule catalog document lists rule metadata
//! together with the catalog version.

// ============================================================================
// SECTION: Imports
// ============================================================================

use daml_sast_core::Finding;
use daml_sast_core::RULESET_VERSION;
use daml_sast_core::rules::RuleMeta;
use serde::Serialize;

use super::ReportError;
use super::to_pretty_json;

// ============================================================================
// SECTION: Findings
// ============================================================================

/// Renders findings as a JSON array.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when serialization fails.
pub fn render_findings(findings: &[Finding]) -> Result<String, ReportError> {
    to_pretty_json(findings)
}

// ============================================================================
// SECTION: Rule Catalog
// ============================================================================

/// Serialized rule catalog.
#[derive(Debug, Serialize)]
struct RuleCatalog<'a> {
    /// Catalog version.
    rules_version: &'static str,
    /// Rules in registry order.
    rules: Vec<RuleEntry<'a>>,
}

/// Serialized metadata of one rule.
#[derive(Debug, Serialize)]
struct RuleEntry<'a> {
    /// Rule id.
    id: &'a str,
    /// Short title.
    title: &'a str,
    /// One-sentence description.
    description: &'a str,
    /// Severity label.
    severity: &'static str,
    /// Confidence label.
    confidence: &'static str,
    /// Category label.
    category: &'static str,
    /// Free-form tags.
    tags: &'a [&'a str],
    /// Why the pattern is hazardous.
    rationale: &'a str,
}

/// Renders rule metadata as a JSON catalog document.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when serialization fails.
pub fn render_rule_catalog<'a>(
    metas: impl IntoIterator<Item = &'a RuleMeta>,
) -> Result<String, ReportError> {
    let rules = metas
        .into_iter()
        .map(|meta| RuleEntry {
            id: meta.id,
            title: meta.title,
            description: meta.description,
            severity: meta.severity.as_str(),
            confidence: meta.confidence.as_str(),
            category: meta.category.as_str(),
            tags: meta.tags,
            rationale: meta.rationale,
        })
        .collect();
    to_pretty_json(&RuleCatalog {
        rules_version: RULESET_VERSION,
        rules,
    })
}
