// daml-sast-config/src/config.rs
// ============================================================================
// Module: Daml SAST Configuration
// Description: Configuration loading and validation for the scanner.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: daml-sast-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys, unknown rule ids, and out-of-range limits are rejected.
//! Hardening limits may be raised or lowered through `DAML_SAST_MAX_*`
//! environment variables, which win over file values but never over the hard
//! caps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use daml_sast_core::RuleRegistry;
use daml_sast_core::RuleSelection;
use daml_sast_core::Severity;
use daml_sast_core::lf::ArchiveLimits;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "daml-sast.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DAML_SAST_CONFIG";
/// Prefix of environment variables overriding hardening limits.
pub const LIMIT_ENV_PREFIX: &str = "DAML_SAST_";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of rule ids in one list.
pub(crate) const MAX_RULE_IDS: usize = 256;

/// One gibibyte.
const GIB: u64 = 1024 * 1024 * 1024;

/// Hard cap on `limits.max_dar_bytes`.
const CAP_DAR_BYTES: u64 = 2 * GIB;
/// Hard cap on `limits.max_entries`.
const CAP_ENTRIES: u64 = 65_536;
/// Hard cap on `limits.max_uncompressed_bytes`.
const CAP_UNCOMPRESSED_BYTES: u64 = 4 * GIB;
/// Hard cap on `limits.max_entry_bytes`.
const CAP_ENTRY_BYTES: u64 = GIB;
/// Hard cap on `limits.max_compression_ratio`.
const CAP_COMPRESSION_RATIO: u64 = 1_000;
/// Hard cap on `limits.max_entry_depth`.
const CAP_ENTRY_DEPTH: u64 = 256;
/// Hard cap on `limits.max_payload_bytes`.
const CAP_PAYLOAD_BYTES: u64 = GIB;
/// Hard cap on `limits.max_package_bytes`.
const CAP_PACKAGE_BYTES: u64 = GIB;
/// Hard cap on `limits.max_proto_depth`. Lowering recurses once per level on
/// a fixed-size analysis stack.
const CAP_PROTO_DEPTH: u64 = 1_000;
/// Hard cap on `limits.max_proto_nodes`.
const CAP_PROTO_NODES: u64 = 50_000_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Daml SAST configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Reporting and exit-code settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Rule allow/deny lists.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Baseline file settings.
    #[serde(default)]
    pub baseline: BaselineConfig,
    /// Suppression file settings.
    #[serde(default)]
    pub suppressions: SuppressionsConfig,
    /// Hardening limit overrides.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// File the configuration was read from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ScanConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is `path`, else `DAML_SAST_CONFIG`, else `daml-sast.toml` in
    /// the working directory. The file must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, process_env)
    }

    /// Like [`ScanConfig::load`], reading environment variables via `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolved = resolve_path(path, &lookup)?;
        Self::read(&resolved.path, &lookup)
    }

    /// Loads configuration when one is named or present, else defaults.
    ///
    /// An explicit path or `DAML_SAST_CONFIG` must point at a readable file.
    /// A missing `daml-sast.toml` in the working directory yields the
    /// defaults, still subject to environment limit overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::discover_with(path, process_env)
    }

    /// Like [`ScanConfig::discover`], reading environment variables via
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn discover_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolved = resolve_path(path, &lookup)?;
        if !resolved.explicit && !resolved.path.exists() {
            let mut config = Self::default();
            config.limits.apply_env(&lookup)?;
            config.validate()?;
            return Ok(config);
        }
        Self::read(&resolved.path, &lookup)
    }

    /// Parses configuration text without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        self.baseline.validate()?;
        self.suppressions.validate()?;
        self.limits.validate()
    }

    /// Returns the failure threshold, defaulting to `MEDIUM` in CI mode.
    #[must_use]
    pub fn effective_fail_on(&self) -> Option<Severity> {
        match self.scanner.fail_on {
            Some(threshold) => Some(threshold),
            None if self.scanner.ci => Some(Severity::Medium),
            None => None,
        }
    }

    /// Reads, parses, overrides, and validates one file.
    fn read<F>(path: &Path, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source = Some(path.to_path_buf());
        config.limits.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }
}

/// Output format of scan reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// JSON findings array.
    #[default]
    Json,
    /// SARIF 2.1.0 log.
    Sarif,
    /// JSON followed by SARIF.
    Both,
}

impl ReportFormat {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sarif => "sarif",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Json, Self::Sarif, Self::Both]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown report format: {value} (expected json, sarif, both)"))
    }
}

/// `[scanner]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScannerConfig {
    /// Minimum severity to report.
    #[serde(default, deserialize_with = "severity_from_text")]
    pub severity: Option<Severity>,
    /// Exit non-zero when a reported finding reaches this severity.
    #[serde(default, deserialize_with = "severity_from_text")]
    pub fail_on: Option<Severity>,
    /// Report format; JSON when unset.
    #[serde(default)]
    pub format: Option<ReportFormat>,
    /// CI mode: defaults `fail_on` to `MEDIUM` and tags SARIF runs.
    #[serde(default)]
    pub ci: bool,
    /// Skip packages that fail lowering instead of aborting the scan.
    #[serde(default)]
    pub skip_bad_packages: bool,
}

/// `[rules]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Rule ids to run; every rule when unset.
    #[serde(default)]
    pub allow: Option<Vec<String>>,
    /// Rule ids never to run.
    #[serde(default)]
    pub deny: Vec<String>,
}

impl RulesConfig {
    /// Returns the rule selection described by this section.
    #[must_use]
    pub fn selection(&self) -> RuleSelection {
        RuleSelection {
            allow: self.allow.as_ref().map(|ids| trimmed_set(ids)),
            deny: trimmed_set(&self.deny),
        }
    }

    /// Validates rule ids against the built-in catalog.
    fn validate(&self) -> Result<(), ConfigError> {
        let registry = RuleRegistry::builtin();
        if let Some(allow) = &self.allow {
            if allow.is_empty() {
                return Err(ConfigError::Invalid(
                    "rules.allow must not be empty; omit it to run every rule".to_string(),
                ));
            }
            validate_rule_ids("rules.allow", allow, &registry)?;
        }
        validate_rule_ids("rules.deny", &self.deny, &registry)?;
        let selection = self.selection();
        if let Some(allow) = &selection.allow
            && let Some(overlap) = allow.intersection(&selection.deny).next()
        {
            return Err(ConfigError::Invalid(format!(
                "rule {overlap} appears in both rules.allow and rules.deny"
            )));
        }
        Ok(())
    }
}

/// `baseline.write`: a flag reusing `baseline.path`, or a separate path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BaselineWrite {
    /// Write to `baseline.path` when true.
    Enabled(bool),
    /// Write to this path.
    Path(String),
}

/// `[baseline]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaselineConfig {
    /// Baseline to apply.
    #[serde(default)]
    pub path: Option<String>,
    /// Baseline to write.
    #[serde(default)]
    pub write: Option<BaselineWrite>,
}

impl BaselineConfig {
    /// Returns where a baseline should be written, if anywhere.
    #[must_use]
    pub fn write_path(&self) -> Option<&str> {
        match &self.write {
            Some(BaselineWrite::Enabled(true)) => self.path.as_deref(),
            Some(BaselineWrite::Path(path)) => Some(path.as_str()),
            Some(BaselineWrite::Enabled(false)) | None => None,
        }
    }

    /// Validates baseline paths.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("baseline.path", path)?;
        }
        match &self.write {
            Some(BaselineWrite::Enabled(true)) if self.path.is_none() => Err(ConfigError::Invalid(
                "baseline.write = true requires baseline.path".to_string(),
            )),
            Some(BaselineWrite::Path(path)) => validate_path_string("baseline.write", path),
            _ => Ok(()),
        }
    }
}

/// `[suppressions]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuppressionsConfig {
    /// Suppression file to apply.
    #[serde(default)]
    pub path: Option<String>,
}

impl SuppressionsConfig {
    /// Validates the suppression path.
    fn validate(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) => validate_path_string("suppressions.path", path),
            None => Ok(()),
        }
    }
}

/// `[limits]` section: overrides of the archive hardening limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum archive size in bytes.
    #[serde(default)]
    pub max_dar_bytes: Option<u64>,
    /// Maximum number of archive entries.
    #[serde(default)]
    pub max_entries: Option<u64>,
    /// Maximum sum of uncompressed entry sizes.
    #[serde(default)]
    pub max_uncompressed_bytes: Option<u64>,
    /// Maximum uncompressed size of one entry.
    #[serde(default)]
    pub max_entry_bytes: Option<u64>,
    /// Maximum uncompressed-to-compressed ratio of one entry.
    #[serde(default)]
    pub max_compression_ratio: Option<u64>,
    /// Maximum path nesting of entry names.
    #[serde(default)]
    pub max_entry_depth: Option<u64>,
    /// Maximum archive payload size.
    #[serde(default)]
    pub max_payload_bytes: Option<u64>,
    /// Maximum encoded package size.
    #[serde(default)]
    pub max_package_bytes: Option<u64>,
    /// Maximum expression nesting depth.
    #[serde(default)]
    pub max_proto_depth: Option<u64>,
    /// Maximum expression node count.
    #[serde(default)]
    pub max_proto_nodes: Option<u64>,
}

impl LimitsConfig {
    /// Returns the effective archive limits.
    #[must_use]
    pub fn archive_limits(&self) -> ArchiveLimits {
        let defaults = ArchiveLimits::default();
        ArchiveLimits {
            max_dar_bytes: self.max_dar_bytes.unwrap_or(defaults.max_dar_bytes),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            max_uncompressed_bytes: self
                .max_uncompressed_bytes
                .unwrap_or(defaults.max_uncompressed_bytes),
            max_entry_bytes: self.max_entry_bytes.unwrap_or(defaults.max_entry_bytes),
            max_compression_ratio: self
                .max_compression_ratio
                .unwrap_or(defaults.max_compression_ratio),
            max_entry_depth: self.max_entry_depth.unwrap_or(defaults.max_entry_depth),
            max_payload_bytes: self.max_payload_bytes.unwrap_or(defaults.max_payload_bytes),
            max_package_bytes: self.max_package_bytes.unwrap_or(defaults.max_package_bytes),
            max_proto_depth: self.max_proto_depth.unwrap_or(defaults.max_proto_depth),
            max_proto_nodes: self.max_proto_nodes.unwrap_or(defaults.max_proto_nodes),
        }
    }

    /// Overrides limits from `DAML_SAST_MAX_*` variables found via `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is not an unsigned
    /// integer.
    pub fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, slot) in self.slots_mut() {
            let key = format!("{LIMIT_ENV_PREFIX}{}", name.to_ascii_uppercase());
            if let Some(raw) = lookup(&key) {
                let value = raw.trim().parse::<u64>().map_err(|_| {
                    ConfigError::Invalid(format!("{key} must be an unsigned integer"))
                })?;
                *slot = Some(value);
            }
        }
        Ok(())
    }

    /// Validates every override against zero and its hard cap.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value, cap) in self.fields() {
            let Some(value) = value else {
                continue;
            };
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "limits.{name} must be greater than zero"
                )));
            }
            if value > cap {
                return Err(ConfigError::Invalid(format!(
                    "limits.{name} exceeds hard cap of {cap}"
                )));
            }
        }
        Ok(())
    }

    /// Returns each override with its name and hard cap.
    const fn fields(&self) -> [(&'static str, Option<u64>, u64); 10] {
        [
            ("max_dar_bytes", self.max_dar_bytes, CAP_DAR_BYTES),
            ("max_entries", self.max_entries, CAP_ENTRIES),
            ("max_uncompressed_bytes", self.max_uncompressed_bytes, CAP_UNCOMPRESSED_BYTES),
            ("max_entry_bytes", self.max_entry_bytes, CAP_ENTRY_BYTES),
            ("max_compression_ratio", self.max_compression_ratio, CAP_COMPRESSION_RATIO),
            ("max_entry_depth", self.max_entry_depth, CAP_ENTRY_DEPTH),
            ("max_payload_bytes", self.max_payload_bytes, CAP_PAYLOAD_BYTES),
            ("max_package_bytes", self.max_package_bytes, CAP_PACKAGE_BYTES),
            ("max_proto_depth", self.max_proto_depth, CAP_PROTO_DEPTH),
            ("max_proto_nodes", self.max_proto_nodes, CAP_PROTO_NODES),
        ]
    }

    /// Returns each override slot with its name.
    const fn slots_mut(&mut self) -> [(&'static str, &mut Option<u64>); 10] {
        [
            ("max_dar_bytes", &mut self.max_dar_bytes),
            ("max_entries", &mut self.max_entries),
            ("max_uncompressed_bytes", &mut self.max_uncompressed_bytes),
            ("max_entry_bytes", &mut self.max_entry_bytes),
            ("max_compression_ratio", &mut self.max_compression_ratio),
            ("max_entry_depth", &mut self.max_entry_depth),
            ("max_payload_bytes", &mut self.max_payload_bytes),
            ("max_package_bytes", &mut self.max_package_bytes),
            ("max_proto_depth", &mut self.max_proto_depth),
            ("max_proto_nodes", &mut self.max_proto_nodes),
        ]
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// A resolved config path and whether the caller named it.
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// True when the path came from the caller or `DAML_SAST_CONFIG`.
    explicit: bool,
}

/// Reads a variable from the process environment.
fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Resolves the config path from the caller or environment defaults.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<ResolvedPath, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a list of rule ids against a registry.
fn validate_rule_ids(
    field: &str,
    ids: &[String],
    registry: &RuleRegistry,
) -> Result<(), ConfigError> {
    if ids.len() > MAX_RULE_IDS {
        return Err(ConfigError::Invalid(format!("{field} lists too many rule ids")));
    }
    for id in ids {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid(format!("{field} entries must be non-empty")));
        }
        if !registry.contains(trimmed) {
            return Err(ConfigError::Invalid(format!("{field} names unknown rule {trimmed}")));
        }
    }
    Ok(())
}

/// Collects trimmed, non-empty ids into a set.
fn trimmed_set(ids: &[String]) -> BTreeSet<String> {
    ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()).map(str::to_string).collect()
}

/// Deserializes a severity label in any case.
fn severity_from_text<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|text| text.parse::<Severity>().map_err(serde::de::Error::custom)).transpose()
}
