// daml-sast-core/src/lf/mod.rs
// ============================================================================
// Module: Daml-LF Input
// Description: Archive reading, wire schema, version matrix, and decoding.
// Purpose: Group everything that touches untrusted archive bytes.
// Dependencies: prost, zip
// ============================================================================

//! ## Overview
//! Archive bytes flow through [`archive::read_dar`] (hardening) and a
//! [`decoder::DalfDecoder`] (envelope, version, package) before anything else
//! in the crate sees them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod archive;
pub mod decoder;
pub mod limits;
pub mod proto;
pub mod resolve;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use archive::DalfEntry;
pub use archive::DarContents;
pub use archive::DarManifest;
pub use archive::read_dar;
pub use decoder::DalfDecoder;
pub use decoder::DecodedPackage;
pub use decoder::ProtoDalfDecoder;
pub use decoder::decode_dalf;
pub use limits::ArchiveLimits;
pub use version::LfVersion;
pub use version::SUPPORTED_VERSIONS;
