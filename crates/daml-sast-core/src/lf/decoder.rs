// daml-sast-core/src/lf/decoder.rs
// ============================================================================
// Module: DALF Decoder
// Description: Envelope verification, version gating, and package decoding.
// Purpose: Turn raw DALF bytes into validated, version-checked packages.
// Dependencies: prost
// ============================================================================

//! ## Overview
//! Decoding proceeds envelope-first: the `Archive` message is parsed, its hash
//! function and payload digest are verified, the `ArchivePayload` declares the
//! Daml-LF version, and only a version from the supported matrix has its
//! package bytes decoded. Decoded packages are then bounded by expression
//! depth and node count, counted over the package as interned references
//! expand it. Protobuf nesting beyond [`WIRE_MESSAGE_DEPTH`] is reported as
//! the same depth limit.
//!
//! `daml-prim` is published as a Daml-LF 2 package inside a Daml-LF 1
//! envelope; it alone is read as Daml-LF 2.1 when that mismatch is found.
//!
//! The [`DalfDecoder`] trait is the seam the scan pipeline decodes through.

// ============================================================================
// SECTION: Imports
// ============================================================================

use prost::Message;

use crate::digest::ContentDigest;
use crate::error::HardeningLimit;
use crate::error::ScanError;
use crate::lf::archive::DalfEntry;
use crate::lf::limits::ArchiveLimits;
use crate::lf::limits::WIRE_MESSAGE_DEPTH;
use crate::lf::limits::len_u64;
use crate::lf::proto;
use crate::lf::proto::archive_payload;
use crate::lf::version::LfVersion;
use crate::lf::version::normalize_version;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message the protobuf parser reports when its nesting guard trips.
const RECURSION_LIMIT_MESSAGE: &str = "recursion limit reached";

/// Package whose Daml-LF 2 builds ship inside Daml-LF 1 envelopes.
const DAML_PRIM: &str = "daml-prim";

/// Minor version a Daml-LF 2 `daml-prim` in a Daml-LF 1 envelope is read as.
const DAML_PRIM_LF2_MINOR: &str = "1";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A decoded, version-checked package.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPackage {
    /// Archive entry the package came from.
    pub entry: String,
    /// Package id (payload SHA-256).
    pub package_id: String,
    /// Declared Daml-LF version.
    pub version: LfVersion,
    /// Declared patch level.
    pub patch: i32,
    /// Package name from metadata.
    pub name: Option<String>,
    /// Package version from metadata.
    pub package_version: Option<String>,
    /// Raw package structure.
    pub package: proto::Package,
}

impl DecodedPackage {
    /// Returns the interned string table.
    #[must_use]
    pub fn interned_strings(&self) -> &[String] {
        &self.package.interned_strings
    }

    /// Returns the interned dotted-name table.
    #[must_use]
    pub fn interned_dotted_names(&self) -> &[proto::InternedDottedName] {
        &self.package.interned_dotted_names
    }
}

/// Decodes DALF entries into packages.
pub trait DalfDecoder {
    /// Decodes one DALF entry.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] when the entry is malformed, exceeds a limit, or
    /// declares an unsupported version.
    fn decode(&self, entry: &DalfEntry, limits: &ArchiveLimits)
    -> Result<DecodedPackage, ScanError>;
}

/// Protobuf-backed [`DalfDecoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtoDalfDecoder;

impl DalfDecoder for ProtoDalfDecoder {
    fn decode(
        &self,
        entry: &DalfEntry,
        limits: &ArchiveLimits,
    ) -> Result<DecodedPackage, ScanError> {
        decode_dalf(&entry.path, &entry.bytes, limits)
    }
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes DALF bytes into a version-checked package.
///
/// # Errors
///
/// Returns [`ScanError::Decode`] on malformed bytes or digest mismatch,
/// [`ScanError::UnsupportedVersion`] for versions outside the matrix, and
/// [`ScanError::HardeningLimitExceeded`] when size or structure limits are hit.
pub fn decode_dalf(
    subject: &str,
    bytes: &[u8],
    limits: &ArchiveLimits,
) -> Result<DecodedPackage, ScanError> {
    limits.enforce(HardeningLimit::EntryBytes, subject, len_u64(bytes.len()))?;
    let archive = proto::Archive::decode(bytes)
        .map_err(|err| ScanError::decode(subject, format!("invalid archive envelope: {err}")))?;
    let hash_function = proto::HashFunction::try_from(archive.hash_function);
    if !matches!(hash_function, Ok(proto::HashFunction::Sha256)) {
        return Err(ScanError::decode(
            subject,
            format!("unsupported hash function {}", archive.hash_function),
        ));
    }
    if archive.payload.is_empty() {
        return Err(ScanError::decode(subject, "archive payload is empty"));
    }
    limits.enforce(HardeningLimit::PayloadBytes, subject, len_u64(archive.payload.len()))?;
    let package_id = verify_payload_hash(subject, &archive)?;

    let payload = proto::ArchivePayload::decode(archive.payload.as_slice())
        .map_err(|err| ScanError::decode(subject, format!("invalid archive payload: {err}")))?;
    let (major, package_bytes) = match payload.sum {
        Some(archive_payload::Sum::DamlLf1(bytes)) => (1, bytes),
        Some(archive_payload::Sum::DamlLf2(bytes)) => (2, bytes),
        None => return Err(ScanError::decode(subject, "archive payload carries no package")),
    };
    let version = normalize_version(major, &payload.minor, subject)?;
    limits.enforce(HardeningLimit::PackageBytes, subject, len_u64(package_bytes.len()))?;
    let package = proto::Package::decode(package_bytes.as_slice())
        .map_err(|err| package_decode_error(subject, &err))?;
    enforce_structure_limits(&package, limits, subject)?;
    let (name, package_version) = package_metadata(&package, subject)?;
    let version = reconcile_major(version, &package, name.as_deref(), subject)?;
    Ok(DecodedPackage {
        entry: subject.to_string(),
        package_id,
        version,
        patch: payload.patch,
        name,
        package_version,
        package,
    })
}

/// Verifies the declared payload hash and returns the package id.
fn verify_payload_hash(subject: &str, archive: &proto::Archive) -> Result<String, ScanError> {
    let digest = ContentDigest::of_bytes(&archive.payload);
    let declared = archive.hash.trim();
    if declared.is_empty() {
        return Ok(digest.into_string());
    }
    if !digest.matches_hex(declared) {
        return Err(ScanError::decode(
            subject,
            format!("payload hash mismatch: declared {declared}, computed {digest}"),
        ));
    }
    Ok(declared.to_ascii_lowercase())
}

/// Maps a package parse failure, reporting the parser's nesting guard as the
/// proto depth limit.
fn package_decode_error(subject: &str, err: &prost::DecodeError) -> ScanError {
    if err.to_string().contains(RECURSION_LIMIT_MESSAGE) {
        return ScanError::HardeningLimitExceeded {
            limit: HardeningLimit::ProtoDepth,
            subject: subject.to_string(),
            actual: WIRE_MESSAGE_DEPTH + 1,
            max: WIRE_MESSAGE_DEPTH,
        };
    }
    ScanError::decode(subject, format!("invalid package: {err}"))
}

/// Bounds expression nesting depth and node count of a decoded package.
///
/// Interned references are followed, so both bounds apply to the package as
/// lowering expands it. A reference that is out of range or already being
/// expanded on the current path is not followed; lowering rejects it.
fn enforce_structure_limits(
    package: &proto::Package,
    limits: &ArchiveLimits,
    subject: &str,
) -> Result<(), ScanError> {
    // Interned expansions as (index, link to the enclosing expansion).
    let mut chain: Vec<(i32, Option<usize>)> = Vec::new();
    let mut stack: Vec<(&proto::Expr, u64, Option<usize>)> =
        package.definition_exprs().into_iter().map(|expr| (expr, 1, None)).collect();
    let mut nodes: u64 = 0;
    while let Some((expr, depth, link)) = stack.pop() {
        nodes += 1;
        limits.enforce(HardeningLimit::ProtoNodes, subject, nodes)?;
        limits.enforce(HardeningLimit::ProtoDepth, subject, depth)?;
        if let Some(proto::expr::Sum::Interned(index)) = &expr.sum {
            let target = usize::try_from(*index)
                .ok()
                .and_then(|slot| package.interned_exprs.get(slot));
            if let Some(target) = target
                && !on_chain(&chain, link, *index)
            {
                chain.push((*index, link));
                stack.push((target, depth + 1, Some(chain.len() - 1)));
            }
            continue;
        }
        stack.extend(expr.child_exprs().into_iter().map(|child| (child, depth + 1, link)));
    }
    Ok(())
}

/// Returns whether `index` is expanded on the path ending at `link`.
fn on_chain(chain: &[(i32, Option<usize>)], mut link: Option<usize>, index: i32) -> bool {
    while let Some((active, parent)) = link.and_then(|slot| chain.get(slot)) {
        if *active == index {
            return true;
        }
        link = *parent;
    }
    false
}

/// Checks the envelope's major version against the package body.
///
/// A package import table exists only in Daml-LF 2. A Daml-LF 1 envelope
/// whose package carries one is accepted only for `daml-prim`, which is then
/// read as Daml-LF 2.1.
fn reconcile_major(
    version: LfVersion,
    package: &proto::Package,
    name: Option<&str>,
    subject: &str,
) -> Result<LfVersion, ScanError> {
    if version.is_lf2() || package.imports.is_none() {
        return Ok(version);
    }
    if name == Some(DAML_PRIM) {
        return normalize_version(2, DAML_PRIM_LF2_MINOR, subject);
    }
    Err(ScanError::decode(subject, "Daml-LF 1 envelope carries a Daml-LF 2 package"))
}

/// Resolves package name and version from interned metadata.
fn package_metadata(
    package: &proto::Package,
    subject: &str,
) -> Result<(Option<String>, Option<String>), ScanError> {
    let Some(metadata) = package.metadata else {
        return Ok((None, None));
    };
    let lookup = |index: i32| {
        usize::try_from(index)
            .ok()
            .and_then(|index| package.interned_strings.get(index))
            .cloned()
            .ok_or_else(|| {
                ScanError::decode(subject, format!("metadata string index {index} out of range"))
            })
    };
    Ok((Some(lookup(metadata.name_interned_str)?), Some(lookup(metadata.version_interned_str)?)))
}
