// daml-sast-core/src/lf/limits.rs
// ============================================================================
// Module: Archive Hardening Limits
// Description: Hard resource limits applied to untrusted DAR input.
// Purpose: Reject oversized or bomb-like archives before any decode.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every limit is a hard ceiling. A violation is a terminal
//! [`ScanError::HardeningLimitExceeded`]; no partial analysis follows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::error::HardeningLimit;
use crate::error::ScanError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// One mebibyte.
const MIB: u64 = 1024 * 1024;

/// Default maximum archive size.
pub const DEFAULT_MAX_DAR_BYTES: u64 = 200 * MIB;
/// Default maximum number of archive entries.
pub const DEFAULT_MAX_ENTRIES: u64 = 2048;
/// Default maximum sum of declared uncompressed entry sizes.
pub const DEFAULT_MAX_UNCOMPRESSED_BYTES: u64 = 300 * MIB;
/// Default maximum uncompressed size of one entry.
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 50 * MIB;
/// Default maximum uncompressed-to-compressed ratio of one entry.
pub const DEFAULT_MAX_COMPRESSION_RATIO: u64 = 100;
/// Default maximum path nesting of entry names.
pub const DEFAULT_MAX_ENTRY_DEPTH: u64 = 32;
/// Default maximum archive payload size inside a DALF envelope.
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 50 * MIB;
/// Default maximum encoded package size.
pub const DEFAULT_MAX_PACKAGE_BYTES: u64 = 50 * MIB;
/// Default maximum expression nesting depth, interned expansions included.
pub const DEFAULT_MAX_PROTO_DEPTH: u64 = 200;
/// Default maximum expression node count per package, interned expansions
/// included.
pub const DEFAULT_MAX_PROTO_NODES: u64 = 500_000;

/// Protobuf message nesting the package parser accepts. Each inline
/// expression level costs about two message levels, so inline nesting deeper
/// than roughly half of this is rejected as [`HardeningLimit::ProtoDepth`]
/// before `max_proto_depth` is consulted. Deeper expressions are only
/// reachable through interned references.
pub const WIRE_MESSAGE_DEPTH: u64 = 100;

/// Entries smaller than this are exempt from the compression ratio check.
pub const COMPRESSION_RATIO_FLOOR_BYTES: u64 = 64 * 1024;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Hardening limits applied by the archive reader and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLimits {
    /// Maximum archive size in bytes.
    pub max_dar_bytes: u64,
    /// Maximum number of archive entries.
    pub max_entries: u64,
    /// Maximum sum of uncompressed entry sizes.
    pub max_uncompressed_bytes: u64,
    /// Maximum uncompressed size of one entry.
    pub max_entry_bytes: u64,
    /// Maximum uncompressed-to-compressed ratio of one entry.
    pub max_compression_ratio: u64,
    /// Maximum path nesting of entry names.
    pub max_entry_depth: u64,
    /// Maximum archive payload size.
    pub max_payload_bytes: u64,
    /// Maximum encoded package size.
    pub max_package_bytes: u64,
    /// Maximum expression nesting depth, interned expansions included.
    pub max_proto_depth: u64,
    /// Maximum expression node count, interned expansions included.
    pub max_proto_nodes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_dar_bytes: DEFAULT_MAX_DAR_BYTES,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_uncompressed_bytes: DEFAULT_MAX_UNCOMPRESSED_BYTES,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            max_compression_ratio: DEFAULT_MAX_COMPRESSION_RATIO,
            max_entry_depth: DEFAULT_MAX_ENTRY_DEPTH,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_package_bytes: DEFAULT_MAX_PACKAGE_BYTES,
            max_proto_depth: DEFAULT_MAX_PROTO_DEPTH,
            max_proto_nodes: DEFAULT_MAX_PROTO_NODES,
        }
    }
}

impl ArchiveLimits {
    /// Returns the configured maximum for a limit.
    #[must_use]
    pub const fn max_for(&self, limit: HardeningLimit) -> u64 {
        match limit {
            HardeningLimit::ArchiveBytes => self.max_dar_bytes,
            HardeningLimit::EntryCount => self.max_entries,
            HardeningLimit::UncompressedBytes => self.max_uncompressed_bytes,
            HardeningLimit::EntryBytes => self.max_entry_bytes,
            HardeningLimit::CompressionRatio => self.max_compression_ratio,
            HardeningLimit::EntryDepth => self.max_entry_depth,
            HardeningLimit::PayloadBytes => self.max_payload_bytes,
            HardeningLimit::PackageBytes => self.max_package_bytes,
            HardeningLimit::ProtoDepth => self.max_proto_depth,
            HardeningLimit::ProtoNodes => self.max_proto_nodes,
        }
    }

    /// Fails when `actual` exceeds the configured maximum for `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::HardeningLimitExceeded`] on violation.
    pub fn enforce(
        &self,
        limit: HardeningLimit,
        subject: &str,
        actual: u64,
    ) -> Result<(), ScanError> {
        let max = self.max_for(limit);
        if actual > max {
            return Err(ScanError::HardeningLimitExceeded {
                limit,
                subject: subject.to_string(),
                actual,
                max,
            });
        }
        Ok(())
    }
}

/// Widens a length to `u64`, saturating on exotic targets.
pub(crate) fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
