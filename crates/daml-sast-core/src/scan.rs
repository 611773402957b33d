// daml-sast-core/src/scan.rs
// ============================================================================
// Module: Scan Pipeline
// Description: Archive -> decode -> lower -> rule engine.
// Purpose: Run a complete scan of one DAR with a chosen failure policy.
// Dependencies: crate::lf, crate::ir, crate::engine, crate::events
// ============================================================================

//! ## Overview
//! [`scan_dar`] is the single entry point for scanning an archive. The
//! rule selection is validated before the archive is opened, every hardening
//! limit is checked before the first protobuf parse, and every entry is
//! decoded before any is lowered. Decode failures always abort. Lowering
//! failures abort under [`LoweringPolicy::AbortScan`] and skip the package
//! under [`LoweringPolicy::SkipPackage`]; a scan in which every package was
//! skipped still fails, and a hardening limit reached while lowering aborts
//! under either policy.
//!
//! Lowering and rule evaluation recurse over expressions, so they run on a
//! dedicated thread with a large stack. Decoding stays on the caller thread.
//!
//! Findings in the report are fingerprinted and in stable order but not yet
//! filtered: severity thresholds, suppressions and baselines are applied by
//! the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic;
use std::thread;

use serde::Serialize;

use crate::engine::EngineReport;
use crate::engine::RuleEngine;
use crate::error::RuleExecutionWarning;
use crate::error::ScanError;
use crate::events::ScanEvent;
use crate::events::ScanEventKind;
use crate::events::ScanEventSink;
use crate::findings::model::Finding;
use crate::ir::lower::lower_package;
use crate::ir::model::Program;
use crate::lf::archive::DarManifest;
use crate::lf::archive::read_dar;
use crate::lf::decoder::DalfDecoder;
use crate::lf::decoder::DecodedPackage;
use crate::lf::limits::ArchiveLimits;
use crate::rules::registry::RuleRegistry;
use crate::rules::registry::RuleSelection;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the thread that lowers packages and runs rules.
const ANALYSIS_THREAD_NAME: &str = "daml-sast-analysis";

/// Stack reserved for lowering and rule evaluation. Lowering and the rule
/// walk recurse once per expression level, up to the proto depth hard cap.
const ANALYSIS_STACK_BYTES: usize = 256 * 1024 * 1024;

// ============================================================================
// SECTION: Options
// ============================================================================

/// What to do when a package fails lowering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoweringPolicy {
    /// Fail the whole scan.
    #[default]
    AbortScan,
    /// Record the failure and continue with the remaining packages.
    SkipPackage,
}

/// Scan configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Hardening limits.
    pub limits: ArchiveLimits,
    /// Lowering failure policy.
    pub lowering_policy: LoweringPolicy,
    /// Rules to run.
    pub selection: RuleSelection,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Identity of an analyzed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    /// Archive entry path.
    pub entry: String,
    /// Package id.
    pub package_id: String,
    /// Package name from metadata.
    pub name: Option<String>,
    /// Package version from metadata.
    pub version: Option<String>,
    /// Declared Daml-LF version.
    pub lf_version: String,
}

impl PackageSummary {
    /// Summarizes a decoded package.
    fn of(decoded: &DecodedPackage) -> Self {
        Self {
            entry: decoded.entry.clone(),
            package_id: decoded.package_id.clone(),
            name: decoded.name.clone(),
            version: decoded.package_version.clone(),
            lf_version: decoded.version.to_string(),
        }
    }
}

/// A package left out of the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPackage {
    /// Package that failed.
    pub package: PackageSummary,
    /// Lowering failure.
    pub error: ScanError,
}

/// Result of a completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Analyzed packages in archive order.
    pub packages: Vec<PackageSummary>,
    /// Findings in stable order, before any filtering.
    pub findings: Vec<Finding>,
    /// Rule hook failures.
    pub warnings: Vec<RuleExecutionWarning>,
    /// Packages skipped under [`LoweringPolicy::SkipPackage`].
    pub skipped: Vec<SkippedPackage>,
    /// Archive manifest, when present.
    pub manifest: Option<DarManifest>,
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Scans a DAR archive.
///
/// # Errors
///
/// Returns [`ScanError::RuleSelection`] when the selection names unknown
/// rules, [`ScanError::HardeningLimitExceeded`],
/// [`ScanError::UnsupportedVersion`] or [`ScanError::Decode`] when the
/// archive is rejected, and [`ScanError::Lowering`] when a package fails
/// lowering under [`LoweringPolicy::AbortScan`] or when every package fails.
pub fn scan_dar(
    bytes: &[u8],
    options: &ScanOptions,
    decoder: &dyn DalfDecoder,
    registry: &RuleRegistry,
    events: &dyn ScanEventSink,
) -> Result<ScanReport, ScanError> {
    let mut engine = RuleEngine::new(registry);
    engine.select(&options.selection).map_err(|err| ScanError::RuleSelection {
        message: err.to_string(),
    })?;

    let contents = read_dar(bytes, &options.limits)?;
    events.record(&ScanEvent::new(ScanEventKind::ArchiveRead {
        dalf_entries: contents.entries.len(),
        has_manifest: contents.manifest.is_some(),
    }));

    let mut decoded = Vec::with_capacity(contents.entries.len());
    for entry in &contents.entries {
        let package = decoder.decode(entry, &options.limits)?;
        events.record(&ScanEvent::new(ScanEventKind::PackageDecoded {
            entry: package.entry.clone(),
            package_id: package.package_id.clone(),
            lf_version: package.version.to_string(),
        }));
        decoded.push(package);
    }

    let Analysis {
        packages,
        skipped,
        report,
    } = on_analysis_stack(|| analyze(&decoded, options, engine.clone(), events))?;
    for warning in &report.warnings {
        events.record(&ScanEvent::new(ScanEventKind::RuleWarning {
            rule_id: warning.rule_id.clone(),
            path: warning.path.clone(),
            message: warning.message.clone(),
        }));
    }
    events.record(&ScanEvent::new(ScanEventKind::ScanCompleted {
        packages: packages.len(),
        findings: report.findings.len(),
        warnings: report.warnings.len(),
    }));

    Ok(ScanReport {
        packages,
        findings: report.findings,
        warnings: report.warnings,
        skipped,
        manifest: contents.manifest,
    })
}

/// Packages lowered and analyzed on the analysis thread.
struct Analysis {
    /// Packages that lowered.
    packages: Vec<PackageSummary>,
    /// Packages skipped under [`LoweringPolicy::SkipPackage`].
    skipped: Vec<SkippedPackage>,
    /// Sorted engine output.
    report: EngineReport,
}

/// Lowers every decoded package and runs the selected rules.
///
/// Hardening limits reached while lowering abort the scan under either
/// policy. The lowered program is dropped before returning.
fn analyze(
    decoded: &[DecodedPackage],
    options: &ScanOptions,
    mut engine: RuleEngine<'_>,
    events: &dyn ScanEventSink,
) -> Result<Analysis, ScanError> {
    let mut program = Program::default();
    let mut packages = Vec::with_capacity(decoded.len());
    let mut skipped = Vec::new();
    for package in decoded {
        match lower_package(package, &options.limits) {
            Ok(lowered) => {
                program.packages.push(lowered);
                packages.push(PackageSummary::of(package));
            }
            Err(error)
                if options.lowering_policy == LoweringPolicy::SkipPackage
                    && !matches!(error, ScanError::HardeningLimitExceeded { .. }) =>
            {
                events.record(&ScanEvent::new(ScanEventKind::PackageSkipped {
                    entry: package.entry.clone(),
                    error: error.to_string(),
                }));
                skipped.push(SkippedPackage {
                    package: PackageSummary::of(package),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }
    if program.packages.is_empty()
        && let Some(first) = skipped.first()
    {
        return Err(first.error.clone());
    }
    let report = engine.run(&program).sorted();
    Ok(Analysis {
        packages,
        skipped,
        report,
    })
}

/// Runs `work` on a thread whose stack fits the deepest expression the
/// hardening limits admit. Falls back to the calling thread when no thread
/// can be spawned; a panic in `work` resumes on the caller.
fn on_analysis_stack<T, F>(work: F) -> T
where
    F: Fn() -> T + Sync,
    T: Send,
{
    thread::scope(|scope| {
        let spawned = thread::Builder::new()
            .name(ANALYSIS_THREAD_NAME.to_string())
            .stack_size(ANALYSIS_STACK_BYTES)
            .spawn_scoped(scope, &work);
        match spawned {
            Ok(handle) => match handle.join() {
                Ok(value) => value,
                Err(payload) => panic::resume_unwind(payload),
            },
            Err(_) => work(),
        }
    })
}
