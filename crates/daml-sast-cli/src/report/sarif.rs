// daml-sast-cli/src/report/sarif.rs
// ============================================================================
// Module: SARIF Report
// Description: SARIF 2.1.0 rendering of scan findings.
// Purpose: Feed code scanning dashboards that consume SARIF.
// Dependencies: daml-sast-core, serde, time
// ============================================================================

//! ## Overview
//! Emits a single-run SARIF 2.1.0 log. The driver lists the metadata of every
//! rule that ran, and each result points at its rule by id and index. Every
//! result carries the finding fingerprint under `damlSast/v1` so that code
//! scanning services track findings across runs.
//!
//! Daml-LF locations carry no file path; a physical location is derived from
//! the module name (`Main.Sub` maps to `Main/Sub.daml` under `SRCROOT`) and is
//! only emitted when the finding has a source span.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use daml_sast_core::Finding;
use daml_sast_core::Severity;
use daml_sast_core::TOOL_VERSION;
use daml_sast_core::ir::Location;
use daml_sast_core::rules::RuleMeta;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::ReportError;
use super::to_pretty_json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// SARIF schema location.
pub const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
/// SARIF format version.
pub const SARIF_VERSION: &str = "2.1.0";
/// Partial fingerprint key carrying the finding fingerprint.
pub const FINGERPRINT_KEY: &str = "damlSast/v1";
/// Automation id attached to CI runs.
pub const CI_AUTOMATION_ID: &str = "daml-sast-ci";
/// Base id the derived artifact URIs are relative to.
const SOURCE_ROOT: &str = "SRCROOT";

// ============================================================================
// SECTION: Context
// ============================================================================

/// Invocation details recorded in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarifContext {
    /// Command line of the invocation.
    pub command_line: String,
    /// Working directory URI.
    pub working_directory: String,
    /// Whether the scan ran in CI mode.
    pub ci: bool,
    /// Scan start time.
    pub start_time: OffsetDateTime,
    /// Scan end time.
    pub end_time: OffsetDateTime,
}

// ============================================================================
// SECTION: Log Model
// ============================================================================

/// SARIF log root.
#[derive(Debug, Serialize)]
struct SarifLog<'a> {
    /// Schema URI.
    #[serde(rename = "$schema")]
    schema: &'static str,
    /// Format version.
    version: &'static str,
    /// Runs in the log.
    runs: Vec<SarifRun<'a>>,
}

/// One analysis run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun<'a> {
    /// Tool description.
    tool: SarifTool<'a>,
    /// Results in report order.
    results: Vec<SarifResult<'a>>,
    /// Invocation record.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invocations: Vec<SarifInvocation>,
    /// Run-level properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<RunProperties>,
    /// Automation details for CI runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    automation_details: Option<AutomationDetails>,
}

/// Tool wrapper.
#[derive(Debug, Serialize)]
struct SarifTool<'a> {
    /// Analysis driver.
    driver: SarifDriver<'a>,
}

/// Analysis driver.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver<'a> {
    /// Tool name.
    name: &'static str,
    /// Tool version.
    version: &'static str,
    /// Semantic version.
    semantic_version: &'static str,
    /// Rule descriptors.
    rules: Vec<SarifRule<'a>>,
}

/// Plain text message.
#[derive(Debug, Serialize)]
struct Message<'a> {
    /// Message text.
    text: &'a str,
}

/// Rule descriptor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule<'a> {
    /// Rule id.
    id: &'a str,
    /// Rule name.
    name: &'a str,
    /// Title.
    short_description: Message<'a>,
    /// Description.
    full_description: Message<'a>,
    /// Rationale.
    help: Message<'a>,
    /// Default level.
    default_configuration: RuleConfiguration,
    /// Rule properties.
    properties: RuleProperties<'a>,
}

/// Default rule configuration.
#[derive(Debug, Serialize)]
struct RuleConfiguration {
    /// SARIF level.
    level: &'static str,
}

/// Rule properties.
#[derive(Debug, Serialize)]
struct RuleProperties<'a> {
    /// Category label.
    category: &'static str,
    /// Tags.
    tags: &'a [&'a str],
    /// Severity label.
    severity: &'static str,
    /// Confidence label.
    confidence: &'static str,
}

/// One result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult<'a> {
    /// Rule id.
    rule_id: &'a str,
    /// Index of the rule in the driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    rule_index: Option<usize>,
    /// SARIF level.
    level: &'static str,
    /// Finding message.
    message: Message<'a>,
    /// Locations.
    locations: Vec<SarifLocation>,
    /// Fingerprints for result matching.
    partial_fingerprints: BTreeMap<&'static str, &'a str>,
    /// Finding properties.
    properties: BTreeMap<&'a str, &'a str>,
}

/// Result location.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    /// Derived source file location.
    #[serde(skip_serializing_if = "Option::is_none")]
    physical_location: Option<PhysicalLocation>,
    /// Module and definition.
    logical_locations: Vec<LogicalLocation>,
}

/// Source file location.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhysicalLocation {
    /// Artifact.
    artifact_location: ArtifactLocation,
    /// Source region.
    region: Region,
}

/// Artifact reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactLocation {
    /// Relative URI.
    uri: String,
    /// Base id the URI is relative to.
    uri_base_id: &'static str,
}

/// Source region.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Region {
    /// First line.
    start_line: u32,
    /// First column.
    start_column: u32,
    /// Last line.
    end_line: u32,
    /// Last column.
    end_column: u32,
}

/// Logical location.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogicalLocation {
    /// Definition label.
    name: String,
    /// Module-qualified label.
    fully_qualified_name: String,
    /// SARIF logical location kind.
    kind: &'static str,
}

/// Invocation record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifInvocation {
    /// Command line.
    command_line: String,
    /// Always true; failed scans produce no report.
    execution_successful: bool,
    /// Working directory.
    working_directory: WorkingDirectory,
    /// Start time, RFC 3339.
    start_time_utc: String,
    /// End time, RFC 3339.
    end_time_utc: String,
}

/// Working directory reference.
#[derive(Debug, Serialize)]
struct WorkingDirectory {
    /// Directory URI.
    uri: String,
}

/// Run-level properties.
#[derive(Debug, Serialize)]
struct RunProperties {
    /// Whether the scan ran in CI mode.
    ci: bool,
}

/// Automation details.
#[derive(Debug, Serialize)]
struct AutomationDetails {
    /// Automation id.
    id: &'static str,
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Maps a severity to a SARIF level.
#[must_use]
pub const fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// Formats a timestamp as RFC 3339 in UTC.
///
/// # Errors
///
/// Returns [`ReportError::Timestamp`] when the timestamp cannot be formatted.
pub fn utc_timestamp(at: OffsetDateTime) -> Result<String, ReportError> {
    at.to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| ReportError::Timestamp(err.to_string()))
}

/// Renders findings as a SARIF 2.1.0 log.
///
/// `rules` lists the rules that ran, in registry order.
///
/// # Errors
///
/// Returns [`ReportError`] when a timestamp or the log cannot be serialized.
pub fn render_sarif(
    findings: &[Finding],
    rules: &[&RuleMeta],
    context: Option<&SarifContext>,
) -> Result<String, ReportError> {
    let descriptors = rules.iter().copied().map(rule_descriptor).collect();
    let results = findings.iter().map(|finding| result_for(finding, rules)).collect();

    let mut run = SarifRun {
        tool: SarifTool {
            driver: SarifDriver {
                name: "daml-sast",
                version: TOOL_VERSION,
                semantic_version: TOOL_VERSION,
                rules: descriptors,
            },
        },
        results,
        invocations: Vec::new(),
        properties: None,
        automation_details: None,
    };

    if let Some(context) = context {
        run.invocations.push(SarifInvocation {
            command_line: context.command_line.clone(),
            execution_successful: true,
            working_directory: WorkingDirectory {
                uri: context.working_directory.clone(),
            },
            start_time_utc: utc_timestamp(context.start_time)?,
            end_time_utc: utc_timestamp(context.end_time)?,
        });
        run.properties = Some(RunProperties {
            ci: context.ci,
        });
        if context.ci {
            run.automation_details = Some(AutomationDetails {
                id: CI_AUTOMATION_ID,
            });
        }
    }

    to_pretty_json(&SarifLog {
        schema: SARIF_SCHEMA,
        version: SARIF_VERSION,
        runs: vec![run],
    })
}

/// Builds the driver descriptor of a rule.
fn rule_descriptor<'a>(meta: &'a RuleMeta) -> SarifRule<'a> {
    SarifRule {
        id: meta.id,
        name: meta.title,
        short_description: Message {
            text: meta.title,
        },
        full_description: Message {
            text: meta.description,
        },
        help: Message {
            text: meta.rationale,
        },
        default_configuration: RuleConfiguration {
            level: sarif_level(meta.severity),
        },
        properties: RuleProperties {
            category: meta.category.as_str(),
            tags: meta.tags,
            severity: meta.severity.as_str(),
            confidence: meta.confidence.as_str(),
        },
    }
}

/// Builds the SARIF result of a finding.
fn result_for<'a>(finding: &'a Finding, rules: &[&RuleMeta]) -> SarifResult<'a> {
    let mut partial_fingerprints = BTreeMap::new();
    if !finding.fingerprint.is_empty() {
        partial_fingerprints.insert(FINGERPRINT_KEY, finding.fingerprint.as_str());
    }

    let mut properties: BTreeMap<&str, &str> =
        finding.metadata.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect();
    properties.insert("confidence", finding.confidence.as_str());
    properties.insert("packageId", finding.package_id.as_str());

    SarifResult {
        rule_id: &finding.rule_id,
        rule_index: rules.iter().position(|meta| meta.id == finding.rule_id),
        level: sarif_level(finding.severity),
        message: Message {
            text: &finding.message,
        },
        locations: vec![location_for(&finding.location)],
        partial_fingerprints,
        properties,
    }
}

/// Builds the SARIF location of a finding location.
fn location_for(location: &Location) -> SarifLocation {
    let physical_location = location.span.map(|span| PhysicalLocation {
        artifact_location: ArtifactLocation {
            uri: module_uri(&location.module),
            uri_base_id: SOURCE_ROOT,
        },
        region: Region {
            start_line: span.start_line.max(1),
            start_column: span.start_col.max(1),
            end_line: span.end_line.max(span.start_line).max(1),
            end_column: span.end_col.max(1),
        },
    });
    let (kind, name) = logical_kind(&location.definition);
    SarifLocation {
        physical_location,
        logical_locations: vec![LogicalLocation {
            name: name.to_string(),
            fully_qualified_name: format!("{}/{}", location.module, name),
            kind,
        }],
    }
}

/// Splits a definition label into a SARIF kind and the bare name.
fn logical_kind(definition: &str) -> (&'static str, &str) {
    if let Some(name) = definition.strip_prefix("Template ") {
        ("type", name)
    } else if let Some(name) = definition.strip_prefix("Choice ") {
        ("function", name)
    } else if let Some(name) = definition.strip_prefix("Value ") {
        ("member", name)
    } else {
        ("module", definition)
    }
}

/// Derives a source path from a dotted module name.
fn module_uri(module: &str) -> String {
    format!("{}.daml", module.replace('.', "/"))
}

