// crates/daml-sast-core/tests/version_matrix.rs
// ============================================================================
// Module: Version Matrix Tests
// Description: Supported and unsupported Daml-LF versions at decode time.
// Purpose: Prove the version gate is an exact enumeration, not a range.
// ============================================================================

//! ## Overview
//! Every supported version decodes a minimal package in both minor spellings;
//! neighbouring versions are rejected with `UnsupportedVersion`, and envelope
//! inconsistencies are decode errors.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::PackageBuilder;
use common::encode_dalf;
use common::encode_dalf_bytes;
use daml_sast_core::ScanError;
use daml_sast_core::digest::ContentDigest;
use daml_sast_core::lf::ArchiveLimits;
use daml_sast_core::lf::LfVersion;
use daml_sast_core::lf::SUPPORTED_VERSIONS;
use daml_sast_core::lf::decode_dalf;
use daml_sast_core::lf::proto;
use prost::Message;

fn minimal_package() -> proto::Package {
    let mut builder = PackageBuilder::new().with_metadata("matrix", "1.0.0");
    let signatories = builder.party_list(&["Alice"]);
    let observers = builder.party_list(&[]);
    let template = builder.template("Asset", signatories, observers);
    builder.add_template("Main", template);
    builder.build()
}

fn decode(dalf: &[u8]) -> Result<daml_sast_core::lf::DecodedPackage, ScanError> {
    decode_dalf("main.dalf", dalf, &ArchiveLimits::default())
}

#[test]
fn every_supported_version_decodes_with_bare_minor() {
    let package = minimal_package();
    for version in SUPPORTED_VERSIONS {
        let dalf = encode_dalf(&package, version.major(), &version.minor().to_string());
        let decoded = decode(&dalf).unwrap_or_else(|err| panic!("{version}: {err}"));
        assert_eq!(decoded.version, *version);
        assert_eq!(decoded.name.as_deref(), Some("matrix"));
        assert_eq!(decoded.package_version.as_deref(), Some("1.0.0"));
    }
}

#[test]
fn every_supported_version_decodes_with_qualified_minor() {
    let package = minimal_package();
    for version in SUPPORTED_VERSIONS {
        let dalf = encode_dalf(&package, version.major(), &version.to_string());
        let decoded = decode(&dalf).unwrap_or_else(|err| panic!("{version}: {err}"));
        assert_eq!(decoded.version, *version);
    }
}

#[test]
fn every_supported_version_lowers_the_minimal_package() {
    let package = minimal_package();
    for version in SUPPORTED_VERSIONS {
        let lowered = common::lower_one(&package, version.major(), &version.minor().to_string())
            .unwrap_or_else(|err| panic!("{version}: {err}"));
        assert_eq!(lowered.lf_version, *version);
        assert_eq!(lowered.modules[0].templates[0].name, "Main.Asset");
    }
}

#[test]
fn versions_outside_the_matrix_are_unsupported() {
    let package = minimal_package();
    let cases = [
        (1, "16", "1.16"),
        (1, "1.16", "1.16"),
        (1, "9", "1.9"),
        (2, "0", "2.0"),
        (2, "3.0", "3.0"),
    ];
    for (major, minor, expected) in cases {
        let dalf = encode_dalf(&package, major, minor);
        match decode(&dalf) {
            Err(ScanError::UnsupportedVersion {
                version,
                subject,
            }) => {
                assert_eq!(version, expected, "minor {minor}");
                assert_eq!(subject, "main.dalf");
            }
            other => panic!("minor {minor}: expected UnsupportedVersion, got {other:?}"),
        }
    }
}

#[test]
fn unsupported_version_is_rejected_before_package_bytes_are_parsed() {
    let dalf = encode_dalf_bytes(vec![0xff, 0xff, 0xff, 0xff], 1, "16");
    assert!(matches!(decode(&dalf), Err(ScanError::UnsupportedVersion { .. })));
}

#[test]
fn missing_minor_is_a_decode_error() {
    let dalf = encode_dalf(&minimal_package(), 1, "  ");
    assert!(matches!(decode(&dalf), Err(ScanError::Decode { .. })));
}

#[test]
fn qualified_minor_must_agree_with_the_envelope_major() {
    let dalf = encode_dalf(&minimal_package(), 2, "1.17");
    let err = decode(&dalf).unwrap_err();
    assert_eq!(err.kind(), "decode_error");
    assert!(err.to_string().contains("envelope major 2"));
}

fn lf2_body(name: &str) -> proto::Package {
    let mut package = PackageBuilder::new().with_metadata(name, "0.0.0").build();
    package.imports = Some(proto::PackageImports {
        imported_packages: Vec::new(),
    });
    package
}

#[test]
fn daml_prim_with_a_daml_lf2_body_is_read_as_lf_2_1() {
    let decoded = decode(&encode_dalf(&lf2_body("daml-prim"), 1, "14")).unwrap();
    assert_eq!(decoded.version, LfVersion::new(2, 1));
    assert_eq!(decoded.name.as_deref(), Some("daml-prim"));
}

#[test]
fn other_lf1_envelopes_with_a_daml_lf2_body_are_decode_errors() {
    let err = decode(&encode_dalf(&lf2_body("daml-stdlib"), 1, "14")).unwrap_err();
    assert_eq!(err.kind(), "decode_error");
    assert!(err.to_string().contains("Daml-LF 2 package"));
}

#[test]
fn lf2_envelopes_accept_import_tables_for_any_package() {
    let decoded = decode(&encode_dalf(&lf2_body("daml-stdlib"), 2, "1")).unwrap();
    assert_eq!(decoded.version, LfVersion::new(2, 1));
}

#[test]
fn package_id_is_the_payload_digest() {
    let dalf = encode_dalf(&minimal_package(), 1, "17");
    let archive = proto::Archive::decode(dalf.as_slice()).unwrap();
    let decoded = decode(&dalf).unwrap();
    assert_eq!(decoded.package_id, ContentDigest::of_bytes(&archive.payload).into_string());
}

#[test]
fn empty_declared_hash_falls_back_to_the_computed_digest() {
    let dalf = encode_dalf(&minimal_package(), 1, "17");
    let mut archive = proto::Archive::decode(dalf.as_slice()).unwrap();
    let expected = archive.hash.clone();
    archive.hash.clear();
    let decoded = decode(&archive.encode_to_vec()).unwrap();
    assert_eq!(decoded.package_id, expected);
}

#[test]
fn declared_hash_mismatch_is_a_decode_error() {
    let dalf = encode_dalf(&minimal_package(), 1, "17");
    let mut archive = proto::Archive::decode(dalf.as_slice()).unwrap();
    archive.hash = "0".repeat(64);
    let err = decode(&archive.encode_to_vec()).unwrap_err();
    assert!(err.to_string().contains("payload hash mismatch"), "{err}");
}

#[test]
fn unknown_hash_function_is_a_decode_error() {
    let dalf = encode_dalf(&minimal_package(), 1, "17");
    let mut archive = proto::Archive::decode(dalf.as_slice()).unwrap();
    archive.hash_function = 7;
    let err = decode(&archive.encode_to_vec()).unwrap_err();
    assert!(err.to_string().contains("unsupported hash function 7"), "{err}");
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = decode(b"definitely not a protobuf archive").unwrap_err();
    assert_eq!(err.kind(), "decode_error");
}

#[test]
fn version_display_is_major_dot_minor() {
    assert_eq!(LfVersion::new(1, 17).to_string(), "1.17");
    assert!(LfVersion::new(2, 1).is_lf2());
    assert!(!LfVersion::new(1, 16).is_supported());
}
