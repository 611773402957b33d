// daml-sast-cli/src/main.rs
// ============================================================================
// Module: Daml SAST CLI Entry Point
// Description: Command dispatcher for scans, the rule catalog, and versions.
// Purpose: Merge config with flags, run the scanner, and map outcomes to exit codes.
// Dependencies: clap, daml-sast-config, daml-sast-core, thiserror, time
// ============================================================================

//! ## Overview
//! `daml-sast scan` loads configuration, overlays command-line flags, reads
//! the DAR under its size limit, and runs the scanner. Findings then pass
//! through suppressions, the severity filter, and the baseline before they
//! are rendered.
//!
//! Exit codes: `0` no findings at or above the failure threshold, `1`
//! findings at or above it, `2` usage or configuration error, `3` scan error.
//! Security posture: the DAR, config, baseline and suppression files are
//! untrusted input; every read is bounded and failures are fatal.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use daml_sast_cli::report::json::render_findings;
use daml_sast_cli::report::json::render_rule_catalog;
use daml_sast_cli::report::sarif::SarifContext;
use daml_sast_cli::report::sarif::render_sarif;
use daml_sast_config::ReportFormat;
use daml_sast_config::ScanConfig;
use daml_sast_core::HardeningLimit;
use daml_sast_core::NoopEventSink;
use daml_sast_core::RULESET_VERSION;
use daml_sast_core::RuleRegistry;
use daml_sast_core::RuleSelection;
use daml_sast_core::ScanError;
use daml_sast_core::ScanEventSink;
use daml_sast_core::ScanOptions;
use daml_sast_core::Severity;
use daml_sast_core::StderrEventSink;
use daml_sast_core::TOOL_VERSION;
use daml_sast_core::findings::Baseline;
use daml_sast_core::findings::Finding;
use daml_sast_core::findings::ScanOutcome;
use daml_sast_core::findings::SuppressionList;
use daml_sast_core::findings::filter_by_severity;
use daml_sast_core::lf::ArchiveLimits;
use daml_sast_core::lf::ProtoDalfDecoder;
use daml_sast_core::lf::SUPPORTED_VERSIONS;
use daml_sast_core::rules::RuleMeta;
use daml_sast_core::scan::LoweringPolicy;
use daml_sast_core::scan::ScanReport;
use daml_sast_core::scan_dar;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "daml-sast", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a DAR archive.
    Scan(ScanCommand),
    /// List the built-in rules.
    Rules(RulesCommand),
    /// Print tool, rule catalog, and Daml-LF versions.
    Versions,
}

/// Arguments for `scan`.
#[derive(Args, Debug, Clone, Default)]
struct ScanCommand {
    /// DAR archive to scan.
    #[arg(long, value_name = "PATH")]
    dar: PathBuf,
    /// Config file (defaults to `DAML_SAST_CONFIG`, then `./daml-sast.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Report format: json, sarif, or both.
    #[arg(long, value_name = "FORMAT", value_parser = parse_format)]
    format: Option<ReportFormat>,
    /// Write the report to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
    /// Comma-separated rule ids to run.
    #[arg(long, value_name = "IDS")]
    rules: Option<String>,
    /// Comma-separated rule ids to skip.
    #[arg(long, value_name = "IDS")]
    exclude: Option<String>,
    /// Minimum severity to report.
    #[arg(long, value_name = "SEVERITY", value_parser = parse_severity)]
    severity: Option<Severity>,
    /// Fail when a reported finding is at or above this severity.
    #[arg(long = "fail-on", value_name = "SEVERITY", value_parser = parse_severity)]
    fail_on: Option<Severity>,
    /// Baseline file whose fingerprints are suppressed.
    #[arg(long, value_name = "PATH")]
    baseline: Option<PathBuf>,
    /// Write a baseline of the current findings to this path.
    #[arg(long = "write-baseline", value_name = "PATH")]
    write_baseline: Option<PathBuf>,
    /// Suppression file with `rule_id [glob]` lines.
    #[arg(long, value_name = "PATH")]
    suppressions: Option<PathBuf>,
    /// CI mode; fails on MEDIUM unless a threshold is set.
    #[arg(long)]
    ci: bool,
    /// Skip packages that fail lowering instead of aborting.
    #[arg(long = "skip-bad-packages")]
    skip_bad_packages: bool,
    /// Log scan events as JSON lines on stderr.
    #[arg(long = "log-events")]
    log_events: bool,
}

/// Arguments for `rules`.
#[derive(Args, Debug)]
struct RulesCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = ListFormat::Text)]
    format: ListFormat,
}

/// Output formats for the rule catalog.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ListFormat {
    /// Aligned text table.
    Text,
    /// JSON catalog document.
    Json,
}

/// Parses a `--format` value.
fn parse_format(value: &str) -> Result<ReportFormat, String> {
    value.parse()
}

/// Parses a severity flag value.
fn parse_severity(value: &str) -> Result<Severity, String> {
    value.parse()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying the outcome it terminates with.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Outcome tier deciding the exit code.
    outcome: ScanOutcome,
}

impl CliError {
    /// Constructs a usage-tier error.
    const fn usage(message: String) -> Self {
        Self {
            message,
            outcome: ScanOutcome::UsageError,
        }
    }

    /// Constructs a scan-tier error.
    const fn scan(message: String) -> Self {
        Self {
            message,
            outcome: ScanOutcome::ScanError,
        }
    }
}

impl From<ScanError> for CliError {
    fn from(err: ScanError) -> Self {
        let message = err.to_string();
        if err.is_usage_error() { Self::usage(message) } else { Self::scan(message) }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Scan(command) => command_scan(&command),
        Commands::Rules(command) => command_rules(&command),
        Commands::Versions => command_versions(),
    }
}

// ============================================================================
// SECTION: Scan Settings
// ============================================================================

/// Scan settings after config and flags are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScanSettings {
    /// DAR archive to scan.
    dar: PathBuf,
    /// Report destination; stdout when unset.
    out: Option<PathBuf>,
    /// Report format.
    format: ReportFormat,
    /// Rule selection.
    selection: RuleSelection,
    /// Minimum reported severity.
    severity: Option<Severity>,
    /// Failure threshold.
    fail_on: Option<Severity>,
    /// CI mode.
    ci: bool,
    /// Baseline to apply.
    baseline: Option<PathBuf>,
    /// Baseline to write.
    write_baseline: Option<PathBuf>,
    /// Suppression file.
    suppressions: Option<PathBuf>,
    /// Lowering failure policy.
    lowering_policy: LoweringPolicy,
    /// Hardening limits.
    limits: ArchiveLimits,
    /// Whether scan events go to stderr.
    log_events: bool,
}

impl ScanSettings {
    /// Merges command-line flags over a loaded config.
    fn resolve(command: &ScanCommand, config: &ScanConfig) -> CliResult<Self> {
        let format = command.format.or(config.scanner.format).unwrap_or_default();
        if command.out.is_some() && format == ReportFormat::Both {
            return Err(CliError::usage(
                "--out writes a single report; choose json or sarif".to_string(),
            ));
        }

        let config_selection = config.rules.selection();
        let selection = RuleSelection {
            allow: command.rules.as_deref().and_then(parse_ids).or(config_selection.allow),
            deny: command.exclude.as_deref().and_then(parse_ids).unwrap_or(config_selection.deny),
        };

        let ci = command.ci || config.scanner.ci;
        let fail_on = command
            .fail_on
            .or(config.scanner.fail_on)
            .or_else(|| ci.then_some(Severity::Medium));
        let lowering_policy = if command.skip_bad_packages || config.scanner.skip_bad_packages {
            LoweringPolicy::SkipPackage
        } else {
            LoweringPolicy::AbortScan
        };

        Ok(Self {
            dar: command.dar.clone(),
            out: command.out.clone(),
            format,
            selection,
            severity: command.severity.or(config.scanner.severity),
            fail_on,
            ci,
            baseline: command
                .baseline
                .clone()
                .or_else(|| config_path(config.baseline.path.as_deref())),
            write_baseline: command
                .write_baseline
                .clone()
                .or_else(|| config_path(config.baseline.write_path())),
            suppressions: command
                .suppressions
                .clone()
                .or_else(|| config_path(config.suppressions.path.as_deref())),
            lowering_policy,
            limits: config.limits.archive_limits(),
            log_events: command.log_events,
        })
    }
}

/// Parses a comma-separated id list; blank lists select nothing.
fn parse_ids(value: &str) -> Option<BTreeSet<String>> {
    let ids: BTreeSet<String> = value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect();
    if ids.is_empty() { None } else { Some(ids) }
}

/// Converts an optional config path string.
fn config_path(value: Option<&str>) -> Option<PathBuf> {
    value.map(PathBuf::from)
}

// ============================================================================
// SECTION: Scan Command
// ============================================================================

/// Executes the `scan` command.
fn command_scan(command: &ScanCommand) -> CliResult<ExitCode> {
    let start_time = OffsetDateTime::now_utc();
    let config = ScanConfig::discover(command.config.as_deref())
        .map_err(|err| CliError::usage(err.to_string()))?;
    let settings = ScanSettings::resolve(command, &config)?;
    let registry = RuleRegistry::builtin();

    let suppressions = settings
        .suppressions
        .as_deref()
        .map(SuppressionList::load)
        .transpose()
        .map_err(|err| CliError::usage(format!("failed to load suppressions: {err}")))?;
    let baseline = settings
        .baseline
        .as_deref()
        .map(Baseline::load)
        .transpose()
        .map_err(|err| CliError::usage(format!("failed to load baseline: {err}")))?;

    let bytes = read_dar(&settings.dar, settings.limits.max_dar_bytes)?;
    let options = ScanOptions {
        limits: settings.limits,
        lowering_policy: settings.lowering_policy,
        selection: settings.selection.clone(),
    };
    let events: &dyn ScanEventSink =
        if settings.log_events { &StderrEventSink } else { &NoopEventSink };
    let report = scan_dar(&bytes, &options, &ProtoDalfDecoder, &registry, events)?;
    report_diagnostics(&report);

    let mut findings = report.findings;
    if let Some(list) = &suppressions {
        findings = list.apply(findings);
    }
    if let Some(path) = &settings.write_baseline {
        write_baseline(path, &findings)?;
    }
    if let Some(minimum) = settings.severity {
        findings = filter_by_severity(findings, minimum);
    }
    if let Some(baseline) = &baseline {
        let outcome = baseline.apply(findings);
        if let Some(mismatch) = &outcome.mismatch {
            warn(&format!(
                "warning: baseline was written for rules {} but this is rules {}; baseline ignored",
                mismatch.found, mismatch.expected
            ));
        }
        findings = outcome.findings;
    }

    let metas: Vec<&RuleMeta> =
        registry.metas().filter(|meta| settings.selection.is_selected(meta.id)).collect();
    let context = SarifContext {
        command_line: command_line(
            std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()),
        ),
        working_directory: working_directory_uri(),
        ci: settings.ci,
        start_time,
        end_time: OffsetDateTime::now_utc(),
    };
    emit_reports(&settings, &findings, &metas, &context)?;

    let outcome = ScanOutcome::classify(&findings, settings.fail_on);
    Ok(ExitCode::from(outcome.exit_code()))
}

/// Prints rule warnings and skipped packages to stderr.
fn report_diagnostics(report: &ScanReport) {
    for warning in &report.warnings {
        warn(&format!(
            "warning: rule {} failed at {}: {}",
            warning.rule_id, warning.path, warning.message
        ));
    }
    for skipped in &report.skipped {
        warn(&format!("warning: skipped package {}: {}", skipped.package.entry, skipped.error));
    }
}

/// Writes a baseline of the given findings.
fn write_baseline(path: &Path, findings: &[Finding]) -> CliResult<()> {
    ensure_parent(path)?;
    Baseline::from_findings(findings)
        .write(path)
        .map_err(|err| CliError::scan(format!("failed to write baseline: {err}")))
}

/// Renders and writes the requested reports.
fn emit_reports(
    settings: &ScanSettings,
    findings: &[Finding],
    metas: &[&RuleMeta],
    context: &SarifContext,
) -> CliResult<()> {
    let render_error = |err: daml_sast_cli::report::ReportError| CliError::scan(err.to_string());
    let out = settings.out.as_deref();
    match settings.format {
        ReportFormat::Json => emit(out, &render_findings(findings).map_err(render_error)?),
        ReportFormat::Sarif => {
            emit(out, &render_sarif(findings, metas, Some(context)).map_err(render_error)?)
        }
        ReportFormat::Both => {
            emit(None, &render_findings(findings).map_err(render_error)?)?;
            emit(None, &render_sarif(findings, metas, Some(context)).map_err(render_error)?)
        }
    }
}

/// Writes a rendered report to a file or stdout.
fn emit(out: Option<&Path>, text: &str) -> CliResult<()> {
    match out {
        Some(path) => {
            ensure_parent(path)?;
            fs::write(path, text).map_err(|err| {
                CliError::scan(format!("failed to write report {}: {err}", path.display()))
            })
        }
        None => write_stdout(text).map_err(|err| CliError::scan(output_error("stdout", &err))),
    }
}

/// Creates the parent directory of an output path.
fn ensure_parent(path: &Path) -> CliResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|err| CliError::scan(format!("failed to create {}: {err}", parent.display()))),
        _ => Ok(()),
    }
}

/// Quotes command-line arguments for the SARIF invocation record.
fn command_line(args: impl IntoIterator<Item = String>) -> String {
    args.into_iter().map(|arg| shell_quote(&arg)).collect::<Vec<_>>().join(" ")
}

/// Single-quotes an argument when a shell would split or expand it.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg.chars().all(|ch| ch.is_ascii_alphanumeric() || "-_./=:,@%+".contains(ch));
    if plain { arg.to_string() } else { format!("'{}'", arg.replace('\'', "'\\''")) }
}

/// Returns the working directory as a file URI.
fn working_directory_uri() -> String {
    std::env::current_dir().map_or_else(
        |_| "file:///".to_string(),
        |dir| format!("file://{}", dir.display()),
    )
}

// ============================================================================
// SECTION: Rules and Versions
// ============================================================================

/// Executes the `rules` command.
fn command_rules(command: &RulesCommand) -> CliResult<ExitCode> {
    let registry = RuleRegistry::builtin();
    match command.format {
        ListFormat::Json => {
            let text = render_rule_catalog(registry.metas())
                .map_err(|err| CliError::scan(err.to_string()))?;
            write_stdout(&text).map_err(|err| CliError::scan(output_error("stdout", &err)))?;
        }
        ListFormat::Text => {
            for meta in registry.metas() {
                write_stdout_line(&format!(
                    "{:<14} {:<9} {:<12} {}",
                    meta.id,
                    meta.severity.as_str(),
                    meta.category.as_str(),
                    meta.title
                ))
                .map_err(|err| CliError::scan(output_error("stdout", &err)))?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `versions` command.
fn command_versions() -> CliResult<ExitCode> {
    let lf_versions =
        SUPPORTED_VERSIONS.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
    let lines = [
        format!("daml-sast {TOOL_VERSION}"),
        format!("rules {RULESET_VERSION}"),
        format!("daml-lf {lf_versions}"),
    ];
    for line in &lines {
        write_stdout_line(line).map_err(|err| CliError::scan(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input
// ============================================================================

/// Errors when reading a size-limited file.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: u64,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    if size > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(max_bytes.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if actual > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads the DAR, reporting an oversized archive as a hardening failure.
fn read_dar(path: &Path, max_bytes: u64) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::usage(format!("failed to read DAR {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::from(ScanError::HardeningLimitExceeded {
            limit: HardeningLimit::ArchiveBytes,
            subject: path.display().to_string(),
            actual: size,
            max: limit,
        }),
    })
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes text to stdout unchanged.
fn write_stdout(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Prints a diagnostic to stderr, ignoring stderr failures.
fn warn(message: &str) {
    let _ = write_stderr_line(message);
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message to stderr and returns the error's exit code.
fn emit_error(err: &CliError) -> ExitCode {
    warn(&format!("error: {err}"));
    ExitCode::from(err.outcome.exit_code())
}
