// daml-sast-core/src/lf/archive.rs
// ============================================================================
// Module: DAR Archive Reader
// Description: Hardened extraction of DALF entries and the DAR manifest.
// Purpose: Enforce every archive-level limit before any protobuf decode.
// Dependencies: zip
// ============================================================================

//! ## Overview
//! A DAR is a zip container holding one or more `.dalf` package archives and
//! a `META-INF/MANIFEST.MF` manifest. The reader runs in two passes: the
//! first inspects only entry headers (count, names, declared sizes,
//! compression ratios); the second decompresses the selected entries through
//! a bounded reader so a lying header cannot exceed the per-entry limit.
//! Security posture: archive bytes are untrusted; all limits fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Cursor;
use std::io::Read;

use zip::ZipArchive;

use crate::error::HardeningLimit;
use crate::error::ScanError;
use crate::lf::limits::ArchiveLimits;
use crate::lf::limits::COMPRESSION_RATIO_FLOOR_BYTES;
use crate::lf::limits::len_u64;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path of the DAR manifest entry.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Subject label used for archive-level errors.
const ARCHIVE_SUBJECT: &str = "archive";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A raw DALF entry extracted from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DalfEntry {
    /// Entry path inside the archive.
    pub path: String,
    /// Raw DALF bytes.
    pub bytes: Vec<u8>,
}

/// Parsed DAR manifest attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DarManifest {
    /// `Main-Dalf` entry path.
    pub main_dalf: Option<String>,
    /// `Sdk-Version` attribute.
    pub sdk_version: Option<String>,
    /// `Format` attribute.
    pub format: Option<String>,
    /// All attributes by name.
    pub attributes: BTreeMap<String, String>,
}

/// Entries and manifest read from a DAR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarContents {
    /// DALF entries in archive enumeration order.
    pub entries: Vec<DalfEntry>,
    /// Manifest, when present.
    pub manifest: Option<DarManifest>,
}

/// Entry classes the reader extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    /// A `.dalf` package archive.
    Dalf,
    /// The DAR manifest.
    Manifest,
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Reads a DAR archive, enforcing all archive-level hardening limits.
///
/// # Errors
///
/// Returns [`ScanError::HardeningLimitExceeded`] on any limit violation and
/// [`ScanError::Decode`] when the container is malformed, an entry name is
/// unsafe, or no `.dalf` entry is present.
pub fn read_dar(bytes: &[u8], limits: &ArchiveLimits) -> Result<DarContents, ScanError> {
    limits.enforce(HardeningLimit::ArchiveBytes, ARCHIVE_SUBJECT, len_u64(bytes.len()))?;
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|err| {
        ScanError::decode(ARCHIVE_SUBJECT, format!("invalid zip container: {err}"))
    })?;
    limits.enforce(HardeningLimit::EntryCount, ARCHIVE_SUBJECT, len_u64(archive.len()))?;

    let selected = inspect_headers(&mut archive, limits)?;

    let mut entries = Vec::new();
    let mut manifest = None;
    let mut total_read: u64 = 0;
    for (index, name, kind) in selected {
        let data = read_bounded(&mut archive, index, &name, limits)?;
        total_read = total_read.saturating_add(len_u64(data.len()));
        limits.enforce(HardeningLimit::UncompressedBytes, ARCHIVE_SUBJECT, total_read)?;
        match kind {
            EntryKind::Dalf => entries.push(DalfEntry {
                path: name,
                bytes: data,
            }),
            EntryKind::Manifest => {
                manifest = Some(parse_manifest(&String::from_utf8_lossy(&data)));
            }
        }
    }
    if entries.is_empty() {
        return Err(ScanError::decode(ARCHIVE_SUBJECT, "no .dalf entries found"));
    }
    Ok(DarContents {
        entries,
        manifest,
    })
}

/// Checks every entry header and returns the entries to extract.
fn inspect_headers(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    limits: &ArchiveLimits,
) -> Result<Vec<(usize, String, EntryKind)>, ScanError> {
    let mut selected = Vec::new();
    let mut declared_total: u64 = 0;
    for index in 0 .. archive.len() {
        let file = archive.by_index_raw(index).map_err(|err| {
            ScanError::decode(ARCHIVE_SUBJECT, format!("unreadable entry header {index}: {err}"))
        })?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        validate_entry_name(&name, limits)?;
        let size = file.size();
        declared_total = declared_total.saturating_add(size);
        limits.enforce(HardeningLimit::UncompressedBytes, ARCHIVE_SUBJECT, declared_total)?;
        limits.enforce(HardeningLimit::EntryBytes, &name, size)?;
        if size >= COMPRESSION_RATIO_FLOOR_BYTES {
            let ratio = size / file.compressed_size().max(1);
            limits.enforce(HardeningLimit::CompressionRatio, &name, ratio)?;
        }
        if let Some(kind) = classify(&name) {
            selected.push((index, name, kind));
        }
    }
    Ok(selected)
}

/// Decompresses one entry, reading at most the per-entry limit plus one byte.
fn read_bounded(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    name: &str,
    limits: &ArchiveLimits,
) -> Result<Vec<u8>, ScanError> {
    let file = archive
        .by_index(index)
        .map_err(|err| ScanError::decode(name, format!("cannot open entry: {err}")))?;
    let mut data = Vec::new();
    file.take(limits.max_entry_bytes.saturating_add(1))
        .read_to_end(&mut data)
        .map_err(|err| ScanError::decode(name, format!("cannot read entry: {err}")))?;
    limits.enforce(HardeningLimit::EntryBytes, name, len_u64(data.len()))?;
    Ok(data)
}

/// Rejects absolute or traversing entry names and deep nesting.
fn validate_entry_name(name: &str, limits: &ArchiveLimits) -> Result<(), ScanError> {
    if name.starts_with('/') || name.starts_with('\\') || name.contains(':') {
        return Err(ScanError::decode(name, "absolute entry path"));
    }
    let mut depth: u64 = 0;
    for component in name.split(['/', '\\']) {
        if component == ".." {
            return Err(ScanError::decode(name, "entry path escapes the archive root"));
        }
        if !component.is_empty() && component != "." {
            depth += 1;
        }
    }
    limits.enforce(HardeningLimit::EntryDepth, name, depth)
}

/// Returns the extraction class of an entry name.
fn classify(name: &str) -> Option<EntryKind> {
    if name.eq_ignore_ascii_case(MANIFEST_PATH) {
        Some(EntryKind::Manifest)
    } else if name.to_ascii_lowercase().ends_with(".dalf") {
        Some(EntryKind::Dalf)
    } else {
        None
    }
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Parses `Key: Value` manifest lines with single-space continuation lines.
#[must_use]
pub fn parse_manifest(text: &str) -> DarManifest {
    let mut attributes = BTreeMap::new();
    let mut current: Option<(String, String)> = None;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some((_, value)) = current.as_mut() {
                value.push_str(rest);
            }
            continue;
        }
        if let Some((key, value)) = current.take() {
            attributes.insert(key, value);
        }
        if let Some((key, value)) = line.split_once(':') {
            current = Some((key.trim().to_string(), value.trim().to_string()));
        }
    }
    if let Some((key, value)) = current {
        attributes.insert(key, value);
    }
    DarManifest {
        main_dalf: attributes.get("Main-Dalf").cloned(),
        sdk_version: attributes.get("Sdk-Version").cloned(),
        format: attributes.get("Format").cloned(),
        attributes,
    }
}
