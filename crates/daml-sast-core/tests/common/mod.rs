// crates/daml-sast-core/tests/common/mod.rs
// ============================================================================
// Module: Test Fixtures
// Description: Builders for raw Daml-LF packages, DALF envelopes, and DARs.
// Purpose: Produce real archive bytes for end-to-end scanner tests.
// ============================================================================

//! ## Overview
//! [`PackageBuilder`] interns every name, so the packages it produces are
//! valid under both Daml-LF 1 and Daml-LF 2. [`encode_dalf`] wraps a package
//! in a hashed `Archive` envelope and [`write_dar`] zips entries into a DAR.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;
use std::io::Cursor;
use std::io::Write;

use daml_sast_core::RuleRegistry;
use daml_sast_core::ScanError;
use daml_sast_core::ScanOptions;
use daml_sast_core::ScanReport;
use daml_sast_core::digest::ContentDigest;
use daml_sast_core::events::NoopEventSink;
use daml_sast_core::findings::Category;
use daml_sast_core::findings::Confidence;
use daml_sast_core::findings::Finding;
use daml_sast_core::findings::Severity;
use daml_sast_core::findings::fingerprint;
use daml_sast_core::ir;
use daml_sast_core::ir::Location;
use daml_sast_core::ir::lower_package;
use daml_sast_core::lf::ArchiveLimits;
use daml_sast_core::lf::ProtoDalfDecoder;
use daml_sast_core::lf::decode_dalf;
use daml_sast_core::lf::proto;
use daml_sast_core::lf::proto::archive_payload;
use daml_sast_core::lf::proto::case_alt;
use daml_sast_core::lf::proto::expr::Sum as ExprSum;
use daml_sast_core::lf::proto::ident;
use daml_sast_core::lf::proto::name;
use daml_sast_core::lf::proto::package_ref;
use daml_sast_core::lf::proto::prim_lit;
use daml_sast_core::lf::proto::ty;
use daml_sast_core::lf::proto::update;
use prost::Message;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// ============================================================================
// SECTION: Package Builder
// ============================================================================

/// Builds raw packages with fully interned names.
#[derive(Debug, Default)]
pub struct PackageBuilder {
    strings: Vec<String>,
    string_slots: BTreeMap<String, i32>,
    dotted: Vec<proto::InternedDottedName>,
    dotted_slots: BTreeMap<String, i32>,
    modules: Vec<(String, proto::Module)>,
    metadata: Option<(String, String)>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, name: &str, version: &str) -> Self {
        self.metadata = Some((name.to_string(), version.to_string()));
        self
    }

    pub fn string(&mut self, value: &str) -> i32 {
        if let Some(slot) = self.string_slots.get(value) {
            return *slot;
        }
        let slot = i32::try_from(self.strings.len()).unwrap();
        self.strings.push(value.to_string());
        self.string_slots.insert(value.to_string(), slot);
        slot
    }

    pub fn dotted(&mut self, value: &str) -> i32 {
        if let Some(slot) = self.dotted_slots.get(value) {
            return *slot;
        }
        let segments = value.split('.').map(|segment| self.string(segment)).collect();
        let slot = i32::try_from(self.dotted.len()).unwrap();
        self.dotted.push(proto::InternedDottedName {
            segments_interned_str: segments,
        });
        self.dotted_slots.insert(value.to_string(), slot);
        slot
    }

    pub fn ident(&mut self, value: &str) -> proto::Ident {
        proto::Ident {
            kind: Some(ident::Kind::InternedStr(self.string(value))),
        }
    }

    pub fn name(&mut self, value: &str) -> proto::Name {
        proto::Name {
            kind: Some(name::Kind::InternedDname(self.dotted(value))),
        }
    }

    pub fn qual(&mut self, module: &str, item: &str) -> proto::QualName {
        proto::QualName {
            module: Some(proto::ModuleRef {
                package_ref: Some(proto::PackageRef {
                    kind: Some(package_ref::Kind::SelfRef(proto::Unit {})),
                }),
                module_name: Some(self.name(module)),
            }),
            name: Some(self.name(item)),
        }
    }

    fn module_mut(&mut self, module: &str) -> &mut proto::Module {
        if !self.modules.iter().any(|(existing, _)| existing == module) {
            let raw = proto::Module {
                name: Some(self.name(module)),
                ..proto::Module::default()
            };
            self.modules.push((module.to_string(), raw));
        }
        let slot = self.modules.iter().position(|(existing, _)| existing == module).unwrap();
        &mut self.modules[slot].1
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    pub fn party_type() -> proto::Type {
        prim_type(proto::PrimType::Party, Vec::new())
    }

    pub fn unit_type() -> proto::Type {
        prim_type(proto::PrimType::Unit, Vec::new())
    }

    pub fn list_type(inner: proto::Type) -> proto::Type {
        prim_type(proto::PrimType::List, vec![inner])
    }

    pub fn con_type(&mut self, module: &str, tycon: &str) -> proto::Type {
        proto::Type {
            sum: Some(ty::Sum::Con(proto::TypeCon {
                tycon: Some(self.qual(module, tycon)),
                args: Vec::new(),
            })),
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub fn party(&mut self, party: &str) -> proto::Expr {
        expr(ExprSum::PrimLit(proto::PrimLit {
            kind: Some(prim_lit::Kind::Party(self.ident(party))),
        }))
    }

    pub fn text(&mut self, value: &str) -> proto::Expr {
        expr(ExprSum::PrimLit(proto::PrimLit {
            kind: Some(prim_lit::Kind::Text(self.ident(value))),
        }))
    }

    pub fn var(&mut self, var: &str) -> proto::Expr {
        expr(ExprSum::Var(self.ident(var)))
    }

    pub fn val(&mut self, module: &str, value: &str) -> proto::Expr {
        expr(ExprSum::Val(self.qual(module, value)))
    }

    pub fn unit() -> proto::Expr {
        expr(ExprSum::PrimCon(proto::PrimCon::ConUnit as i32))
    }

    pub fn bool_con(value: bool) -> proto::Expr {
        let con = if value { proto::PrimCon::ConTrue } else { proto::PrimCon::ConFalse };
        expr(ExprSum::PrimCon(con as i32))
    }

    /// A `List Party` literal, encoded as `Cons` over `Nil` like the compiler emits.
    pub fn party_list(&mut self, parties: &[&str]) -> proto::Expr {
        let items = parties.iter().map(|party| self.party(party)).collect();
        Self::list(Self::party_type(), items)
    }

    pub fn list(elem: proto::Type, items: Vec<proto::Expr>) -> proto::Expr {
        let nil = expr(ExprSum::Nil(proto::Nil {
            typ: Some(elem.clone()),
        }));
        if items.is_empty() {
            return nil;
        }
        expr(ExprSum::Cons(proto::Cons {
            typ: Some(elem),
            front: items,
            tail: Some(Box::new(nil)),
        }))
    }

    pub fn rec_proj(
        &mut self,
        module: &str,
        tycon: &str,
        field: &str,
        record: proto::Expr,
    ) -> proto::Expr {
        let tycon = proto::TypeCon {
            tycon: Some(self.qual(module, tycon)),
            args: Vec::new(),
        };
        expr(ExprSum::RecProj(proto::RecProj {
            tycon: Some(tycon),
            field: Some(self.ident(field)),
            record: Some(Box::new(record)),
        }))
    }

    pub fn rec_con(
        &mut self,
        module: &str,
        tycon: &str,
        fields: Vec<(&str, proto::Expr)>,
    ) -> proto::Expr {
        let tycon = proto::TypeCon {
            tycon: Some(self.qual(module, tycon)),
            args: Vec::new(),
        };
        let fields = fields
            .into_iter()
            .map(|(field, value)| proto::FieldWithExpr {
                field: Some(self.ident(field)),
                expr: Some(value),
            })
            .collect();
        expr(ExprSum::RecCon(proto::RecCon {
            tycon: Some(tycon),
            fields,
        }))
    }

    pub fn app(fun: proto::Expr, args: Vec<proto::Expr>) -> proto::Expr {
        expr(ExprSum::App(proto::App {
            fun: Some(Box::new(fun)),
            args,
        }))
    }

    pub fn lambda(&mut self, param: &str, typ: proto::Type, body: proto::Expr) -> proto::Expr {
        expr(ExprSum::Abs(proto::Abs {
            params: vec![proto::VarWithType {
                var: Some(self.ident(param)),
                typ: Some(typ),
            }],
            body: Some(Box::new(body)),
        }))
    }

    pub fn let_in(&mut self, binder: &str, bound: proto::Expr, body: proto::Expr) -> proto::Expr {
        expr(ExprSum::Let(proto::Block {
            bindings: vec![proto::Binding {
                binder: Some(proto::VarWithType {
                    var: Some(self.ident(binder)),
                    typ: None,
                }),
                bound: Some(bound),
            }],
            body: Some(Box::new(body)),
        }))
    }

    /// `case scrutinee of True -> when_true; _ -> otherwise`.
    pub fn if_then_else(
        scrutinee: proto::Expr,
        when_true: proto::Expr,
        otherwise: proto::Expr,
    ) -> proto::Expr {
        expr(ExprSum::Case(proto::Case {
            scrut: Some(Box::new(scrutinee)),
            alts: vec![
                proto::CaseAlt {
                    pattern: Some(case_alt::Pattern::PrimCon(proto::PrimCon::ConTrue as i32)),
                    body: Some(when_true),
                },
                proto::CaseAlt {
                    pattern: Some(case_alt::Pattern::Default(proto::Unit {})),
                    body: Some(otherwise),
                },
            ],
        }))
    }

    // ------------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------------

    pub fn pure_unit() -> proto::Expr {
        update_expr(update::Sum::Pure(proto::UpdateEmbed {
            typ: Some(Self::unit_type()),
            expr: Some(Box::new(Self::unit())),
        }))
    }

    pub fn get_time() -> proto::Expr {
        update_expr(update::Sum::GetTime(proto::Unit {}))
    }

    pub fn create(&mut self, module: &str, template: &str, arg: proto::Expr) -> proto::Expr {
        update_expr(update::Sum::Create(proto::UpdateCreate {
            template: Some(self.qual(module, template)),
            expr: Some(Box::new(arg)),
        }))
    }

    pub fn exercise(
        &mut self,
        module: &str,
        template: &str,
        choice: &str,
        cid: proto::Expr,
        arg: proto::Expr,
    ) -> proto::Expr {
        update_expr(update::Sum::Exercise(proto::UpdateExercise {
            template: Some(self.qual(module, template)),
            choice: Some(self.ident(choice)),
            cid: Some(Box::new(cid)),
            arg: Some(Box::new(arg)),
        }))
    }

    pub fn fetch(&mut self, module: &str, template: &str, cid: proto::Expr) -> proto::Expr {
        update_expr(update::Sum::Fetch(proto::UpdateFetch {
            template: Some(self.qual(module, template)),
            cid: Some(Box::new(cid)),
        }))
    }

    /// Sequences updates in a `do` block, discarding intermediate results.
    pub fn update_block(&mut self, steps: Vec<proto::Expr>, last: proto::Expr) -> proto::Expr {
        let bindings = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| proto::Binding {
                binder: Some(proto::VarWithType {
                    var: Some(self.ident(&format!("_step{index}"))),
                    typ: None,
                }),
                bound: Some(step),
            })
            .collect();
        update_expr(update::Sum::Block(proto::Block {
            bindings,
            body: Some(Box::new(last)),
        }))
    }

    // ------------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------------

    pub fn record(&mut self, module: &str, tycon: &str, fields: Vec<(&str, proto::Type)>) {
        let record_fields = fields
            .into_iter()
            .map(|(field, typ)| proto::FieldWithType {
                field: Some(self.ident(field)),
                typ: Some(typ),
            })
            .collect();
        let data_type = proto::DefDataType {
            name: Some(self.name(tycon)),
            record_fields,
            ..proto::DefDataType::default()
        };
        self.module_mut(module).data_types.push(data_type);
    }

    pub fn template(
        &mut self,
        tycon: &str,
        signatories: proto::Expr,
        observers: proto::Expr,
    ) -> proto::DefTemplate {
        proto::DefTemplate {
            tycon: Some(self.name(tycon)),
            param: Some(self.ident("this")),
            signatories: Some(signatories),
            observers: Some(observers),
            ..proto::DefTemplate::default()
        }
    }

    pub fn choice(
        &mut self,
        name: &str,
        consuming: bool,
        controllers: proto::Expr,
        update: proto::Expr,
    ) -> proto::TemplateChoice {
        proto::TemplateChoice {
            name: Some(self.ident(name)),
            consuming,
            controllers: Some(controllers),
            arg_binder: Some(proto::VarWithType {
                var: Some(self.ident("arg")),
                typ: Some(Self::unit_type()),
            }),
            ret_type: Some(Self::unit_type()),
            update: Some(update),
            self_binder: Some(self.ident("self")),
            ..proto::TemplateChoice::default()
        }
    }

    pub fn key(typ: proto::Type, body: proto::Expr, maintainers: proto::Expr) -> proto::DefKey {
        proto::DefKey {
            typ: Some(typ),
            body: Some(body),
            maintainers: Some(maintainers),
        }
    }

    pub fn add_template(&mut self, module: &str, template: proto::DefTemplate) {
        self.module_mut(module).templates.push(template);
    }

    pub fn add_value(&mut self, module: &str, value: &str, typ: proto::Type, body: proto::Expr) {
        let def = proto::DefValue {
            name: Some(self.name(value)),
            typ: Some(typ),
            expr: Some(body),
            location: None,
        };
        self.module_mut(module).values.push(def);
    }

    pub fn build(mut self) -> proto::Package {
        let metadata = self.metadata.take().map(|(name, version)| proto::PackageMetadata {
            name_interned_str: self.string(&name),
            version_interned_str: self.string(&version),
        });
        proto::Package {
            modules: self.modules.into_iter().map(|(_, module)| module).collect(),
            interned_strings: self.strings,
            interned_dotted_names: self.dotted,
            metadata,
            ..proto::Package::default()
        }
    }
}

// ============================================================================
// SECTION: Expression Helpers
// ============================================================================

pub fn expr(sum: ExprSum) -> proto::Expr {
    proto::Expr {
        location: None,
        sum: Some(sum),
    }
}

pub fn update_expr(sum: update::Sum) -> proto::Expr {
    expr(ExprSum::Update(proto::Update {
        sum: Some(sum),
    }))
}

pub fn prim_type(prim: proto::PrimType, args: Vec<proto::Type>) -> proto::Type {
    proto::Type {
        sum: Some(ty::Sum::Prim(proto::TypePrim {
            prim: prim as i32,
            args,
        })),
    }
}

/// Attaches a zero-based source range to an expression.
pub fn located(mut raw: proto::Expr, line: i32) -> proto::Expr {
    raw.location = Some(range_location(line));
    raw
}

pub fn range_location(line: i32) -> proto::Location {
    proto::Location {
        module: None,
        range: Some(proto::Range {
            start_line: line,
            start_col: 2,
            end_line: line,
            end_col: 30,
        }),
    }
}

// ============================================================================
// SECTION: Envelopes and Archives
// ============================================================================

/// Encodes a package into a DALF with a SHA-256 payload hash.
pub fn encode_dalf(package: &proto::Package, major: u32, minor: &str) -> Vec<u8> {
    encode_dalf_bytes(package.encode_to_vec(), major, minor)
}

/// Encodes raw package bytes into a DALF with a SHA-256 payload hash.
pub fn encode_dalf_bytes(package: Vec<u8>, major: u32, minor: &str) -> Vec<u8> {
    let sum = if major == 2 {
        archive_payload::Sum::DamlLf2(package)
    } else {
        archive_payload::Sum::DamlLf1(package)
    };
    let payload = proto::ArchivePayload {
        minor: minor.to_string(),
        patch: 0,
        sum: Some(sum),
    }
    .encode_to_vec();
    let hash = ContentDigest::of_bytes(&payload).into_string();
    proto::Archive {
        hash_function: proto::HashFunction::Sha256 as i32,
        payload,
        hash,
    }
    .encode_to_vec()
}

/// Zips entries into a DAR, optionally with a manifest.
pub fn write_dar(entries: &[(&str, Vec<u8>)], manifest: Option<&str>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if let Some(manifest) = manifest {
        writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
        writer.write_all(manifest.as_bytes()).unwrap();
    }
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Wraps one package into a single-entry DAR.
pub fn single_package_dar(package: &proto::Package, major: u32, minor: &str) -> Vec<u8> {
    write_dar(&[("main.dalf", encode_dalf(package, major, minor))], None)
}

// ============================================================================
// SECTION: Scanning
// ============================================================================

/// Scans a DAR with default options and the built-in catalog.
pub fn scan(dar: &[u8]) -> Result<ScanReport, ScanError> {
    scan_with(dar, &ScanOptions::default())
}

/// Scans a DAR with the built-in catalog.
pub fn scan_with(dar: &[u8], options: &ScanOptions) -> Result<ScanReport, ScanError> {
    let registry = RuleRegistry::builtin();
    daml_sast_core::scan_dar(dar, options, &ProtoDalfDecoder, &registry, &NoopEventSink)
}

/// Decodes and lowers one package.
pub fn lower_one(
    package: &proto::Package,
    major: u32,
    minor: &str,
) -> Result<ir::Package, ScanError> {
    let dalf = encode_dalf(package, major, minor);
    let limits = ArchiveLimits::default();
    let decoded = decode_dalf("main.dalf", &dalf, &limits)?;
    lower_package(&decoded, &limits)
}

/// Returns the rule ids of a report's findings, in report order.
pub fn rule_ids(report: &ScanReport) -> Vec<&str> {
    report.findings.iter().map(|finding| finding.rule_id.as_str()).collect()
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// Builds a finding directly, with a fingerprint derived from its identity.
pub fn sample_finding(
    rule_id: &str,
    module: &str,
    definition: &str,
    severity: Severity,
) -> Finding {
    let location = Location {
        module: module.to_string(),
        definition: definition.to_string(),
        span: None,
    };
    let fingerprint = fingerprint(rule_id, Category::Auth, &location, &[]).unwrap();
    Finding {
        rule_id: rule_id.to_string(),
        title: format!("{rule_id} title"),
        severity,
        confidence: Confidence::Medium,
        category: Category::Auth,
        message: format!("{rule_id} fired"),
        package_id: "f".repeat(64),
        location,
        evidence: Vec::new(),
        related: Vec::new(),
        metadata: BTreeMap::new(),
        fingerprint,
    }
}
