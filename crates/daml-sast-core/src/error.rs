// daml-sast-core/src/error.rs
// ============================================================================
// Module: Scan Errors
// Description: Fatal scan error taxonomy and non-fatal rule warnings.
// Purpose: Give callers one typed signal per failure class.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Hardening, version, and decode failures are terminal for the affected
//! archive. Lowering failures identify the package, module, and definition so
//! the caller can decide whether to skip the package or abort the scan. Rule
//! hook failures never abort a scan; they surface as
//! [`RuleExecutionWarning`] records.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Hardening Limits
// ============================================================================

/// Identifies which hardening limit an archive violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HardeningLimit {
    /// Total archive size in bytes.
    ArchiveBytes,
    /// Number of entries in the archive.
    EntryCount,
    /// Sum of declared uncompressed entry sizes.
    UncompressedBytes,
    /// Uncompressed size of a single entry.
    EntryBytes,
    /// Uncompressed-to-compressed ratio of a single entry.
    CompressionRatio,
    /// Path component nesting of an entry name.
    EntryDepth,
    /// Size of the archive payload inside a DALF envelope.
    PayloadBytes,
    /// Size of the encoded package inside the payload.
    PackageBytes,
    /// Expression nesting depth of a decoded package.
    ProtoDepth,
    /// Expression node count of a decoded package.
    ProtoNodes,
}

impl HardeningLimit {
    /// Returns the stable label of the limit.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArchiveBytes => "archive_bytes",
            Self::EntryCount => "entry_count",
            Self::UncompressedBytes => "uncompressed_bytes",
            Self::EntryBytes => "entry_bytes",
            Self::CompressionRatio => "compression_ratio",
            Self::EntryDepth => "entry_depth",
            Self::PayloadBytes => "payload_bytes",
            Self::PackageBytes => "package_bytes",
            Self::ProtoDepth => "proto_depth",
            Self::ProtoNodes => "proto_nodes",
        }
    }
}

impl fmt::Display for HardeningLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Scan Errors
// ============================================================================

/// Fatal scan failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The archive violated a hard resource limit.
    #[error("hardening limit {limit} exceeded by {subject}: {actual} > {max}")]
    HardeningLimitExceeded {
        /// Violated limit.
        limit: HardeningLimit,
        /// Archive or entry that violated the limit.
        subject: String,
        /// Observed value.
        actual: u64,
        /// Configured maximum.
        max: u64,
    },
    /// The package declares a Daml-LF version outside the supported matrix.
    #[error("Unsupported Daml-LF version: {version} ({subject})")]
    UnsupportedVersion {
        /// Entry that declared the version.
        subject: String,
        /// Declared version string.
        version: String,
    },
    /// The archive or one of its payloads is malformed.
    #[error("decode error in {subject}: {message}")]
    Decode {
        /// Archive or entry that failed to decode.
        subject: String,
        /// Failure detail.
        message: String,
    },
    /// A decoded package is inconsistent with its declared grammar.
    #[error("lowering error in {package_id} at {module}/{definition}: {message}")]
    Lowering {
        /// Package id of the offending package.
        package_id: String,
        /// Module containing the offending definition.
        module: String,
        /// Offending definition label.
        definition: String,
        /// Failure detail.
        message: String,
    },
    /// The rule selection names rules the registry does not hold.
    #[error("invalid rule selection: {message}")]
    RuleSelection {
        /// Failure detail.
        message: String,
    },
}

impl ScanError {
    /// Builds a decode error for the given subject.
    pub(crate) fn decode(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Returns the stable label of the error class.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::HardeningLimitExceeded {
                ..
            } => "hardening_limit_exceeded",
            Self::UnsupportedVersion {
                ..
            } => "unsupported_version",
            Self::Decode {
                ..
            } => "decode_error",
            Self::Lowering {
                ..
            } => "lowering_error",
            Self::RuleSelection {
                ..
            } => "rule_selection",
        }
    }

    /// Returns true when the failure stems from caller input, not the archive.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::RuleSelection {
                ..
            }
        )
    }
}

// ============================================================================
// SECTION: Rule Warnings
// ============================================================================

/// A rule hook failed on a single node; traversal continued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleExecutionWarning {
    /// Rule that failed.
    pub rule_id: String,
    /// Walker breadcrumb at the failing node.
    pub path: String,
    /// Failure detail reported by the rule.
    pub message: String,
}

impl fmt::Display for RuleExecutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} failed at {}: {}", self.rule_id, self.path, self.message)
    }
}
