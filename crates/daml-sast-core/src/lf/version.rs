// daml-sast-core/src/lf/version.rs
// ============================================================================
// Module: Daml-LF Version Matrix
// Description: Supported Daml-LF versions and version normalization.
// Purpose: Reject any package outside the enumerated version matrix.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The supported set is an exact enumeration, not a range. Payloads carry the
//! major version in the envelope variant and the minor as a string that may be
//! either bare (`"7"`) or qualified (`"1.7"`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde::Serializer;

use crate::error::ScanError;

// ============================================================================
// SECTION: Versions
// ============================================================================

/// A Daml-LF `major.minor` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LfVersion {
    /// Major version.
    major: u32,
    /// Minor version.
    minor: u32,
}

impl LfVersion {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
        }
    }

    /// Returns the major version.
    #[must_use]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// Returns the minor version.
    #[must_use]
    pub const fn minor(self) -> u32 {
        self.minor
    }

    /// Returns true for Daml-LF 2 packages.
    #[must_use]
    pub const fn is_lf2(self) -> bool {
        self.major == 2
    }

    /// Returns true when the version is in the supported matrix.
    #[must_use]
    pub fn is_supported(self) -> bool {
        SUPPORTED_VERSIONS.contains(&self)
    }
}

impl fmt::Display for LfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for LfVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Supported Daml-LF versions.
pub const SUPPORTED_VERSIONS: &[LfVersion] = &[
    LfVersion::new(1, 6),
    LfVersion::new(1, 7),
    LfVersion::new(1, 8),
    LfVersion::new(1, 11),
    LfVersion::new(1, 14),
    LfVersion::new(1, 15),
    LfVersion::new(1, 17),
    LfVersion::new(2, 1),
];

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Resolves the declared version of a payload against the supported matrix.
///
/// # Errors
///
/// Returns [`ScanError::Decode`] when the minor is missing or its major
/// disagrees with the envelope, and [`ScanError::UnsupportedVersion`] when the
/// declared version is outside the matrix.
pub fn normalize_version(
    envelope_major: u32,
    minor: &str,
    subject: &str,
) -> Result<LfVersion, ScanError> {
    let minor = minor.trim();
    if minor.is_empty() {
        return Err(ScanError::decode(subject, "payload is missing its minor version"));
    }
    let unsupported = |version: String| ScanError::UnsupportedVersion {
        subject: subject.to_string(),
        version,
    };
    if let Some((major_text, minor_text)) = minor.split_once('.') {
        let (Ok(major), Ok(minor_value)) = (major_text.parse::<u32>(), minor_text.parse::<u32>())
        else {
            return Err(unsupported(minor.to_string()));
        };
        let version = LfVersion::new(major, minor_value);
        if !version.is_supported() {
            return Err(unsupported(version.to_string()));
        }
        if major != envelope_major {
            return Err(ScanError::decode(
                subject,
                format!(
                    "declared version {version} does not match envelope major {envelope_major}"
                ),
            ));
        }
        return Ok(version);
    }
    let Ok(minor_value) = minor.parse::<u32>() else {
        return Err(unsupported(format!("{envelope_major}.{minor}")));
    };
    let version = LfVersion::new(envelope_major, minor_value);
    if !version.is_supported() {
        return Err(unsupported(version.to_string()));
    }
    Ok(version)
}
