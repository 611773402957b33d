// daml-sast-core/src/lf/proto.rs
// ============================================================================
// Module: Daml-LF Wire Schema
// Description: Protobuf messages for DALF envelopes and Daml-LF packages.
// Purpose: Decode archive bytes into raw package structures with prost.
// Dependencies: prost
// ============================================================================

//! ## Overview
//! Messages are declared with `prost` derives rather than generated from
//! `.proto` files. Daml-LF 1 and Daml-LF 2 packages share one schema: names
//! may be carried inline (`Str`/`Dname` arms, Daml-LF 1 only) or as indexes
//! into the package's interned tables. Field names follow the Daml-LF
//! archive protos.

#![allow(
    missing_docs,
    clippy::missing_docs_in_private_items,
    reason = "Wire messages mirror the Daml-LF protobuf field names."
)]

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Hash functions accepted for archive payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum HashFunction {
    Sha256 = 0,
}

/// Outer DALF envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Archive {
    #[prost(enumeration = "HashFunction", tag = "1")]
    pub hash_function: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
    #[prost(string, tag = "4")]
    pub hash: String,
}

/// Versioned payload carried by an [`Archive`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ArchivePayload {
    #[prost(string, tag = "3")]
    pub minor: String,
    #[prost(int32, tag = "4")]
    pub patch: i32,
    #[prost(oneof = "archive_payload::Sum", tags = "2, 5")]
    pub sum: Option<archive_payload::Sum>,
}

pub mod archive_payload {
    /// Major-version specific package bytes.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Sum {
        #[prost(bytes = "vec", tag = "2")]
        DamlLf1(Vec<u8>),
        #[prost(bytes = "vec", tag = "5")]
        DamlLf2(Vec<u8>),
    }
}

// ============================================================================
// SECTION: Names
// ============================================================================

/// Empty marker message.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Unit {}

/// Inline dotted name.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DottedName {
    #[prost(string, repeated, tag = "1")]
    pub segments: Vec<String>,
}

/// Interned dotted name: indexes into the interned string table.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InternedDottedName {
    #[prost(int32, repeated, tag = "1")]
    pub segments_interned_str: Vec<i32>,
}

/// A simple identifier, inline or interned.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ident {
    #[prost(oneof = "ident::Kind", tags = "1, 2")]
    pub kind: Option<ident::Kind>,
}

pub mod ident {
    /// Identifier encoding.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(string, tag = "1")]
        Str(String),
        #[prost(int32, tag = "2")]
        InternedStr(i32),
    }
}

/// A dotted name, inline or interned.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Name {
    #[prost(oneof = "name::Kind", tags = "1, 2")]
    pub kind: Option<name::Kind>,
}

pub mod name {
    /// Dotted name encoding.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        Dname(super::DottedName),
        #[prost(int32, tag = "2")]
        InternedDname(i32),
    }
}

/// Reference to the current package or another package.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PackageRef {
    #[prost(oneof = "package_ref::Kind", tags = "1, 2, 3, 4")]
    pub kind: Option<package_ref::Kind>,
}

pub mod package_ref {
    /// Package reference encoding.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        SelfRef(super::Unit),
        #[prost(string, tag = "2")]
        PackageIdStr(String),
        #[prost(int32, tag = "3")]
        PackageIdInternedStr(i32),
        #[prost(int32, tag = "4")]
        ImportId(i32),
    }
}

/// Reference to a module in some package.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModuleRef {
    #[prost(message, optional, tag = "1")]
    pub package_ref: Option<PackageRef>,
    #[prost(message, optional, tag = "2")]
    pub module_name: Option<Name>,
}

/// Module-qualified name of a type constructor, synonym, or value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QualName {
    #[prost(message, optional, tag = "1")]
    pub module: Option<ModuleRef>,
    #[prost(message, optional, tag = "2")]
    pub name: Option<Name>,
}

// ============================================================================
// SECTION: Package
// ============================================================================

/// A Daml-LF package.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Package {
    #[prost(message, repeated, tag = "1")]
    pub modules: Vec<Module>,
    #[prost(string, repeated, tag = "2")]
    pub interned_strings: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub interned_dotted_names: Vec<InternedDottedName>,
    #[prost(message, optional, tag = "4")]
    pub metadata: Option<PackageMetadata>,
    #[prost(message, repeated, tag = "5")]
    pub interned_types: Vec<Type>,
    #[prost(message, repeated, tag = "6")]
    pub interned_exprs: Vec<Expr>,
    #[prost(message, optional, tag = "7")]
    pub imports: Option<PackageImports>,
}

/// Package name and version, as interned string indexes.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct PackageMetadata {
    #[prost(int32, tag = "1")]
    pub name_interned_str: i32,
    #[prost(int32, tag = "2")]
    pub version_interned_str: i32,
}

/// Package ids referenced by `ImportId` package references.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PackageImports {
    #[prost(string, repeated, tag = "1")]
    pub imported_packages: Vec<String>,
}

/// A module and its definitions.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Module {
    #[prost(message, optional, tag = "1")]
    pub name: Option<Name>,
    #[prost(message, repeated, tag = "2")]
    pub data_types: Vec<DefDataType>,
    #[prost(message, repeated, tag = "3")]
    pub values: Vec<DefValue>,
    #[prost(message, repeated, tag = "4")]
    pub templates: Vec<DefTemplate>,
}

/// Source location of a definition or expression.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Location {
    #[prost(message, optional, tag = "1")]
    pub module: Option<ModuleRef>,
    #[prost(message, optional, tag = "2")]
    pub range: Option<Range>,
}

/// Zero-based source range.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Range {
    #[prost(int32, tag = "1")]
    pub start_line: i32,
    #[prost(int32, tag = "2")]
    pub start_col: i32,
    #[prost(int32, tag = "3")]
    pub end_line: i32,
    #[prost(int32, tag = "4")]
    pub end_col: i32,
}

/// Data type definition. Only record fields are consumed by lowering.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefDataType {
    #[prost(message, optional, tag = "1")]
    pub name: Option<Name>,
    #[prost(message, repeated, tag = "2")]
    pub params: Vec<Ident>,
    #[prost(message, repeated, tag = "3")]
    pub record_fields: Vec<FieldWithType>,
    #[prost(message, repeated, tag = "4")]
    pub variant_fields: Vec<FieldWithType>,
    #[prost(message, repeated, tag = "5")]
    pub enum_constructors: Vec<Ident>,
    #[prost(message, optional, tag = "6")]
    pub location: Option<Location>,
}

/// Named, typed field.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldWithType {
    #[prost(message, optional, tag = "1")]
    pub field: Option<Ident>,
    #[prost(message, optional, tag = "2")]
    pub typ: Option<Type>,
}

/// Top-level value definition.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefValue {
    #[prost(message, optional, tag = "1")]
    pub name: Option<Name>,
    #[prost(message, optional, tag = "2")]
    pub typ: Option<Type>,
    #[prost(message, optional, tag = "3")]
    pub expr: Option<Expr>,
    #[prost(message, optional, tag = "4")]
    pub location: Option<Location>,
}

/// Template definition.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefTemplate {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<Name>,
    #[prost(message, optional, tag = "2")]
    pub param: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub precond: Option<Expr>,
    #[prost(message, optional, tag = "4")]
    pub signatories: Option<Expr>,
    #[prost(message, optional, tag = "5")]
    pub observers: Option<Expr>,
    #[prost(message, repeated, tag = "6")]
    pub choices: Vec<TemplateChoice>,
    #[prost(message, optional, tag = "7")]
    pub key: Option<DefKey>,
    #[prost(message, optional, tag = "8")]
    pub location: Option<Location>,
}

/// Contract key definition.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefKey {
    #[prost(message, optional, tag = "1")]
    pub typ: Option<Type>,
    #[prost(message, optional, tag = "2")]
    pub body: Option<Expr>,
    #[prost(message, optional, tag = "3")]
    pub maintainers: Option<Expr>,
}

/// Choice definition.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TemplateChoice {
    #[prost(message, optional, tag = "1")]
    pub name: Option<Ident>,
    #[prost(bool, tag = "2")]
    pub consuming: bool,
    #[prost(message, optional, tag = "3")]
    pub controllers: Option<Expr>,
    #[prost(message, optional, tag = "4")]
    pub observers: Option<Expr>,
    #[prost(message, optional, tag = "5")]
    pub authorizers: Option<Expr>,
    #[prost(message, optional, tag = "6")]
    pub arg_binder: Option<VarWithType>,
    #[prost(message, optional, tag = "7")]
    pub ret_type: Option<Type>,
    #[prost(message, optional, tag = "8")]
    pub update: Option<Expr>,
    #[prost(message, optional, tag = "9")]
    pub self_binder: Option<Ident>,
    #[prost(message, optional, tag = "10")]
    pub location: Option<Location>,
}

/// Binder with its declared type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VarWithType {
    #[prost(message, optional, tag = "1")]
    pub var: Option<Ident>,
    #[prost(message, optional, tag = "2")]
    pub typ: Option<Type>,
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Builtin (primitive) type constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PrimType {
    Unit = 0,
    Bool = 1,
    Int64 = 2,
    Text = 3,
    Timestamp = 4,
    Party = 5,
    List = 6,
    Update = 7,
    Date = 8,
    ContractId = 9,
    Optional = 10,
    Arrow = 11,
    TextMap = 12,
    Numeric = 13,
    Any = 14,
    TypeRep = 15,
    GenMap = 16,
    AnyException = 17,
    BigNumeric = 18,
    RoundingMode = 19,
}

/// A Daml-LF type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Type {
    #[prost(oneof = "ty::Sum", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9")]
    pub sum: Option<ty::Sum>,
}

pub mod ty {
    /// Type variants.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Sum {
        #[prost(message, tag = "1")]
        Var(super::TypeVar),
        #[prost(message, tag = "2")]
        Con(super::TypeCon),
        #[prost(message, tag = "3")]
        Prim(super::TypePrim),
        #[prost(message, tag = "4")]
        Forall(super::TypeForall),
        #[prost(message, tag = "5")]
        Struct(super::TypeStruct),
        #[prost(int64, tag = "6")]
        Nat(i64),
        #[prost(message, tag = "7")]
        Syn(super::TypeSyn),
        #[prost(int32, tag = "8")]
        Interned(i32),
        #[prost(message, tag = "9")]
        App(super::TypeApp),
    }
}

/// Type variable application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeVar {
    #[prost(message, optional, tag = "1")]
    pub var: Option<Ident>,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Type>,
}

/// Type constructor application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeCon {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<QualName>,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Type>,
}

/// Primitive type application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypePrim {
    #[prost(enumeration = "PrimType", tag = "1")]
    pub prim: i32,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Type>,
}

/// Universally quantified type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeForall {
    #[prost(message, repeated, tag = "1")]
    pub vars: Vec<Ident>,
    #[prost(message, optional, tag = "2")]
    pub body: Option<Box<Type>>,
}

/// Structural record type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeStruct {
    #[prost(message, repeated, tag = "1")]
    pub fields: Vec<FieldWithType>,
}

/// Type synonym application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeSyn {
    #[prost(message, optional, tag = "1")]
    pub tysyn: Option<QualName>,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Type>,
}

/// Binary type application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeApp {
    #[prost(message, optional, tag = "1")]
    pub lhs: Option<Box<Type>>,
    #[prost(message, optional, tag = "2")]
    pub rhs: Option<Box<Type>>,
}

// ============================================================================
// SECTION: Expressions
// ============================================================================

/// Builtin functions recognised by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BuiltinFunction {
    Trace = 0,
    Equal = 1,
    Less = 2,
    LessEq = 3,
    Greater = 4,
    GreaterEq = 5,
    AppendText = 6,
    AddInt64 = 7,
    SubInt64 = 8,
    MulInt64 = 9,
    Error = 10,
    Foldl = 11,
    Foldr = 12,
    PartyToText = 13,
    TextToParty = 14,
    EqualList = 15,
    CoerceContractId = 16,
}

impl BuiltinFunction {
    /// Returns the Daml-LF builtin name.
    #[must_use]
    pub const fn lf_name(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Equal => "EQUAL",
            Self::Less => "LESS",
            Self::LessEq => "LESS_EQ",
            Self::Greater => "GREATER",
            Self::GreaterEq => "GREATER_EQ",
            Self::AppendText => "APPEND_TEXT",
            Self::AddInt64 => "ADD_INT64",
            Self::SubInt64 => "SUB_INT64",
            Self::MulInt64 => "MUL_INT64",
            Self::Error => "ERROR",
            Self::Foldl => "FOLDL",
            Self::Foldr => "FOLDR",
            Self::PartyToText => "PARTY_TO_TEXT",
            Self::TextToParty => "TEXT_TO_PARTY",
            Self::EqualList => "EQUAL_LIST",
            Self::CoerceContractId => "COERCE_CONTRACT_ID",
        }
    }
}

/// Primitive constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PrimCon {
    ConUnit = 0,
    ConFalse = 1,
    ConTrue = 2,
}

impl PrimCon {
    /// Returns the constructor name used in the IR.
    #[must_use]
    pub const fn ir_name(self) -> &'static str {
        match self {
            Self::ConUnit => "Unit",
            Self::ConFalse => "False",
            Self::ConTrue => "True",
        }
    }
}

/// Interface operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum InterfaceOpKind {
    ToInterface = 0,
    FromInterface = 1,
    CallInterface = 2,
    ViewInterface = 3,
    SignatoryInterface = 4,
    ObserverInterface = 5,
    InterfaceTemplateTypeRep = 6,
}

/// A Daml-LF expression.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Expr {
    #[prost(message, optional, tag = "1")]
    pub location: Option<Location>,
    #[prost(
        oneof = "expr::Sum",
        tags = "2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30"
    )]
    pub sum: Option<expr::Sum>,
}

pub mod expr {
    /// Expression variants.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Sum {
        #[prost(message, tag = "2")]
        Var(super::Ident),
        #[prost(message, tag = "3")]
        Val(super::QualName),
        #[prost(enumeration = "super::BuiltinFunction", tag = "4")]
        Builtin(i32),
        #[prost(enumeration = "super::PrimCon", tag = "5")]
        PrimCon(i32),
        #[prost(message, tag = "6")]
        PrimLit(super::PrimLit),
        #[prost(message, tag = "7")]
        RecCon(super::RecCon),
        #[prost(message, tag = "8")]
        RecProj(super::RecProj),
        #[prost(message, tag = "9")]
        RecUpd(super::RecUpd),
        #[prost(message, tag = "10")]
        VariantCon(super::VariantCon),
        #[prost(message, tag = "11")]
        EnumCon(super::EnumCon),
        #[prost(message, tag = "12")]
        StructCon(super::StructCon),
        #[prost(message, tag = "13")]
        StructProj(super::StructProj),
        #[prost(message, tag = "14")]
        StructUpd(super::StructUpd),
        #[prost(message, tag = "15")]
        App(super::App),
        #[prost(message, tag = "16")]
        TyApp(super::TyApp),
        #[prost(message, tag = "17")]
        Abs(super::Abs),
        #[prost(message, tag = "18")]
        TyAbs(super::TyAbs),
        #[prost(message, tag = "19")]
        Case(super::Case),
        #[prost(message, tag = "20")]
        Let(super::Block),
        #[prost(message, tag = "21")]
        Nil(super::Nil),
        #[prost(message, tag = "22")]
        Cons(super::Cons),
        #[prost(message, tag = "23")]
        Update(super::Update),
        #[prost(message, tag = "24")]
        OptionalNone(super::OptionalNone),
        #[prost(message, tag = "25")]
        OptionalSome(super::OptionalSome),
        #[prost(message, tag = "26")]
        ToAny(super::AnyConversion),
        #[prost(message, tag = "27")]
        FromAny(super::AnyConversion),
        #[prost(message, tag = "28")]
        Throw(super::Throw),
        #[prost(message, tag = "29")]
        Interface(super::InterfaceOp),
        #[prost(int32, tag = "30")]
        Interned(i32),
    }
}

/// Primitive literal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrimLit {
    #[prost(oneof = "prim_lit::Kind", tags = "1, 2, 3, 4, 5, 6")]
    pub kind: Option<prim_lit::Kind>,
}

pub mod prim_lit {
    /// Literal variants.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(int64, tag = "1")]
        Int64(i64),
        #[prost(message, tag = "2")]
        Numeric(super::Ident),
        #[prost(message, tag = "3")]
        Text(super::Ident),
        #[prost(int64, tag = "4")]
        Timestamp(i64),
        #[prost(message, tag = "5")]
        Party(super::Ident),
        #[prost(int32, tag = "6")]
        Date(i32),
    }
}

/// Field name with its value expression.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldWithExpr {
    #[prost(message, optional, tag = "1")]
    pub field: Option<Ident>,
    #[prost(message, optional, tag = "2")]
    pub expr: Option<Expr>,
}

/// Record construction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecCon {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<TypeCon>,
    #[prost(message, repeated, tag = "2")]
    pub fields: Vec<FieldWithExpr>,
}

/// Record field projection.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecProj {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<TypeCon>,
    #[prost(message, optional, tag = "2")]
    pub field: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub record: Option<Box<Expr>>,
}

/// Record field update.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecUpd {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<TypeCon>,
    #[prost(message, optional, tag = "2")]
    pub field: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub record: Option<Box<Expr>>,
    #[prost(message, optional, tag = "4")]
    pub update: Option<Box<Expr>>,
}

/// Variant construction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VariantCon {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<TypeCon>,
    #[prost(message, optional, tag = "2")]
    pub variant: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub arg: Option<Box<Expr>>,
}

/// Enum construction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumCon {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub constructor: Option<Ident>,
}

/// Struct construction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StructCon {
    #[prost(message, repeated, tag = "1")]
    pub fields: Vec<FieldWithExpr>,
}

/// Struct field projection.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StructProj {
    #[prost(message, optional, tag = "1")]
    pub field: Option<Ident>,
    #[prost(message, optional, tag = "2")]
    pub structure: Option<Box<Expr>>,
}

/// Struct field update.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StructUpd {
    #[prost(message, optional, tag = "1")]
    pub field: Option<Ident>,
    #[prost(message, optional, tag = "2")]
    pub structure: Option<Box<Expr>>,
    #[prost(message, optional, tag = "3")]
    pub update: Option<Box<Expr>>,
}

/// Function application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct App {
    #[prost(message, optional, tag = "1")]
    pub fun: Option<Box<Expr>>,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Expr>,
}

/// Type application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TyApp {
    #[prost(message, optional, tag = "1")]
    pub expr: Option<Box<Expr>>,
    #[prost(message, repeated, tag = "2")]
    pub types: Vec<Type>,
}

/// Lambda abstraction over one or more binders.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Abs {
    #[prost(message, repeated, tag = "1")]
    pub params: Vec<VarWithType>,
    #[prost(message, optional, tag = "2")]
    pub body: Option<Box<Expr>>,
}

/// Type abstraction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TyAbs {
    #[prost(message, repeated, tag = "1")]
    pub params: Vec<Ident>,
    #[prost(message, optional, tag = "2")]
    pub body: Option<Box<Expr>>,
}

/// Case expression.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Case {
    #[prost(message, optional, tag = "1")]
    pub scrut: Option<Box<Expr>>,
    #[prost(message, repeated, tag = "2")]
    pub alts: Vec<CaseAlt>,
}

/// Case alternative.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CaseAlt {
    #[prost(oneof = "case_alt::Pattern", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
    pub pattern: Option<case_alt::Pattern>,
    #[prost(message, optional, tag = "9")]
    pub body: Option<Expr>,
}

pub mod case_alt {
    /// Case patterns.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Pattern {
        #[prost(message, tag = "1")]
        Default(super::Unit),
        #[prost(message, tag = "2")]
        Variant(super::CaseVariant),
        #[prost(enumeration = "super::PrimCon", tag = "3")]
        PrimCon(i32),
        #[prost(message, tag = "4")]
        Nil(super::Unit),
        #[prost(message, tag = "5")]
        Cons(super::CaseCons),
        #[prost(message, tag = "6")]
        OptionalNone(super::Unit),
        #[prost(message, tag = "7")]
        OptionalSome(super::CaseOptionalSome),
        #[prost(message, tag = "8")]
        Enum(super::CaseEnum),
    }
}

/// Variant pattern.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CaseVariant {
    #[prost(message, optional, tag = "1")]
    pub con: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub variant: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub binder: Option<Ident>,
}

/// List cons pattern.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CaseCons {
    #[prost(message, optional, tag = "1")]
    pub head: Option<Ident>,
    #[prost(message, optional, tag = "2")]
    pub tail: Option<Ident>,
}

/// Optional-some pattern.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CaseOptionalSome {
    #[prost(message, optional, tag = "1")]
    pub var: Option<Ident>,
}

/// Enum pattern.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CaseEnum {
    #[prost(message, optional, tag = "1")]
    pub con: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub constructor: Option<Ident>,
}

/// Let block (also used for update blocks).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Block {
    #[prost(message, repeated, tag = "1")]
    pub bindings: Vec<Binding>,
    #[prost(message, optional, tag = "2")]
    pub body: Option<Box<Expr>>,
}

/// Single binding in a block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Binding {
    #[prost(message, optional, tag = "1")]
    pub binder: Option<VarWithType>,
    #[prost(message, optional, tag = "2")]
    pub bound: Option<Expr>,
}

/// Empty list.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Nil {
    #[prost(message, optional, tag = "1")]
    pub typ: Option<Type>,
}

/// List cons: front elements prepended to a tail.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cons {
    #[prost(message, optional, tag = "1")]
    pub typ: Option<Type>,
    #[prost(message, repeated, tag = "2")]
    pub front: Vec<Expr>,
    #[prost(message, optional, tag = "3")]
    pub tail: Option<Box<Expr>>,
}

/// Empty optional.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OptionalNone {
    #[prost(message, optional, tag = "1")]
    pub typ: Option<Type>,
}

/// Present optional.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OptionalSome {
    #[prost(message, optional, tag = "1")]
    pub typ: Option<Type>,
    #[prost(message, optional, tag = "2")]
    pub body: Option<Box<Expr>>,
}

/// Conversion to or from `Any`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AnyConversion {
    #[prost(message, optional, tag = "1")]
    pub typ: Option<Type>,
    #[prost(message, optional, tag = "2")]
    pub expr: Option<Box<Expr>>,
}

/// Exception throw.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Throw {
    #[prost(message, optional, tag = "1")]
    pub return_type: Option<Type>,
    #[prost(message, optional, tag = "2")]
    pub exception_type: Option<Type>,
    #[prost(message, optional, tag = "3")]
    pub exception_expr: Option<Box<Expr>>,
}

/// Interface operation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InterfaceOp {
    #[prost(enumeration = "InterfaceOpKind", tag = "1")]
    pub op: i32,
    #[prost(message, optional, tag = "2")]
    pub interface: Option<QualName>,
    #[prost(message, optional, tag = "3")]
    pub template: Option<QualName>,
    #[prost(message, optional, tag = "4")]
    pub method: Option<Ident>,
    #[prost(message, repeated, tag = "5")]
    pub args: Vec<Expr>,
}

// ============================================================================
// SECTION: Updates
// ============================================================================

/// Ledger update expression.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Update {
    #[prost(
        oneof = "update::Sum",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18"
    )]
    pub sum: Option<update::Sum>,
}

pub mod update {
    /// Update variants.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Sum {
        #[prost(message, tag = "1")]
        Pure(super::UpdateEmbed),
        #[prost(message, tag = "2")]
        Block(super::Block),
        #[prost(message, tag = "3")]
        Create(super::UpdateCreate),
        #[prost(message, tag = "4")]
        CreateInterface(super::UpdateCreate),
        #[prost(message, tag = "5")]
        Exercise(super::UpdateExercise),
        #[prost(message, tag = "6")]
        ExerciseByKey(super::UpdateExerciseByKey),
        #[prost(message, tag = "7")]
        ExerciseInterface(super::UpdateExerciseInterface),
        #[prost(message, tag = "8")]
        DynamicExercise(super::UpdateExercise),
        #[prost(message, tag = "9")]
        SoftExercise(super::UpdateExercise),
        #[prost(message, tag = "10")]
        Fetch(super::UpdateFetch),
        #[prost(message, tag = "11")]
        SoftFetch(super::UpdateFetch),
        #[prost(message, tag = "12")]
        FetchInterface(super::UpdateFetch),
        #[prost(message, tag = "13")]
        LookupByKey(super::UpdateByKey),
        #[prost(message, tag = "14")]
        FetchByKey(super::UpdateByKey),
        #[prost(message, tag = "15")]
        GetTime(super::Unit),
        #[prost(message, tag = "16")]
        LedgerTimeLt(super::UpdateEmbed),
        #[prost(message, tag = "17")]
        EmbedExpr(super::UpdateEmbed),
        #[prost(message, tag = "18")]
        TryCatch(super::UpdateTryCatch),
    }
}

/// Update wrapping a single expression (`pure`, `embed_expr`, ledger-time bound).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateEmbed {
    #[prost(message, optional, tag = "1")]
    pub typ: Option<Type>,
    #[prost(message, optional, tag = "2")]
    pub expr: Option<Box<Expr>>,
}

/// Contract creation (template or interface).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateCreate {
    #[prost(message, optional, tag = "1")]
    pub template: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub expr: Option<Box<Expr>>,
}

/// Choice exercise by contract id.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateExercise {
    #[prost(message, optional, tag = "1")]
    pub template: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub choice: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub cid: Option<Box<Expr>>,
    #[prost(message, optional, tag = "4")]
    pub arg: Option<Box<Expr>>,
}

/// Choice exercise by contract key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateExerciseByKey {
    #[prost(message, optional, tag = "1")]
    pub template: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub choice: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub key: Option<Box<Expr>>,
    #[prost(message, optional, tag = "4")]
    pub arg: Option<Box<Expr>>,
}

/// Interface choice exercise.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateExerciseInterface {
    #[prost(message, optional, tag = "1")]
    pub interface: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub choice: Option<Ident>,
    #[prost(message, optional, tag = "3")]
    pub cid: Option<Box<Expr>>,
    #[prost(message, optional, tag = "4")]
    pub arg: Option<Box<Expr>>,
    #[prost(message, optional, tag = "5")]
    pub guard: Option<Box<Expr>>,
}

/// Contract fetch by id.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateFetch {
    #[prost(message, optional, tag = "1")]
    pub template: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub cid: Option<Box<Expr>>,
}

/// Contract lookup or fetch by key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateByKey {
    #[prost(message, optional, tag = "1")]
    pub template: Option<QualName>,
    #[prost(message, optional, tag = "2")]
    pub key: Option<Box<Expr>>,
}

/// Exception handler.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateTryCatch {
    #[prost(message, optional, tag = "1")]
    pub return_type: Option<Type>,
    #[prost(message, optional, tag = "2")]
    pub try_expr: Option<Box<Expr>>,
    #[prost(message, optional, tag = "3")]
    pub var: Option<Ident>,
    #[prost(message, optional, tag = "4")]
    pub catch_expr: Option<Box<Expr>>,
}

// ============================================================================
// SECTION: Structural Traversal
// ============================================================================

impl Package {
    /// Returns the top-level expression of every definition, in declaration
    /// order. Interned expressions are reached through references only.
    #[must_use]
    pub fn definition_exprs(&self) -> Vec<&Expr> {
        let mut roots = Vec::new();
        for module in &self.modules {
            for value in &module.values {
                roots.extend(value.expr.as_ref());
            }
            for template in &module.templates {
                roots.extend(template.precond.as_ref());
                roots.extend(template.signatories.as_ref());
                roots.extend(template.observers.as_ref());
                if let Some(key) = &template.key {
                    roots.extend(key.body.as_ref());
                    roots.extend(key.maintainers.as_ref());
                }
                for choice in &template.choices {
                    roots.extend(choice.controllers.as_ref());
                    roots.extend(choice.observers.as_ref());
                    roots.extend(choice.authorizers.as_ref());
                    roots.extend(choice.update.as_ref());
                }
            }
        }
        roots
    }
}

impl Expr {
    /// Returns the direct sub-expressions of this expression.
    #[must_use]
    pub fn child_exprs(&self) -> Vec<&Self> {
        use expr::Sum;
        let mut out: Vec<&Self> = Vec::new();
        match &self.sum {
            Some(Sum::RecCon(rec)) => out.extend(field_exprs(&rec.fields)),
            Some(Sum::RecProj(proj)) => out.extend(proj.record.as_deref()),
            Some(Sum::RecUpd(upd)) => {
                out.extend(upd.record.as_deref());
                out.extend(upd.update.as_deref());
            }
            Some(Sum::VariantCon(con)) => out.extend(con.arg.as_deref()),
            Some(Sum::StructCon(con)) => out.extend(field_exprs(&con.fields)),
            Some(Sum::StructProj(proj)) => out.extend(proj.structure.as_deref()),
            Some(Sum::StructUpd(upd)) => {
                out.extend(upd.structure.as_deref());
                out.extend(upd.update.as_deref());
            }
            Some(Sum::App(app)) => {
                out.extend(app.fun.as_deref());
                out.extend(app.args.iter());
            }
            Some(Sum::TyApp(app)) => out.extend(app.expr.as_deref()),
            Some(Sum::Abs(abs)) => out.extend(abs.body.as_deref()),
            Some(Sum::TyAbs(abs)) => out.extend(abs.body.as_deref()),
            Some(Sum::Case(case)) => {
                out.extend(case.scrut.as_deref());
                out.extend(case.alts.iter().filter_map(|alt| alt.body.as_ref()));
            }
            Some(Sum::Let(block)) => out.extend(block_exprs(block)),
            Some(Sum::Cons(cons)) => {
                out.extend(cons.front.iter());
                out.extend(cons.tail.as_deref());
            }
            Some(Sum::Update(update)) => out.extend(update.child_exprs()),
            Some(Sum::OptionalSome(some)) => out.extend(some.body.as_deref()),
            Some(Sum::ToAny(conv) | Sum::FromAny(conv)) => out.extend(conv.expr.as_deref()),
            Some(Sum::Throw(throw)) => out.extend(throw.exception_expr.as_deref()),
            Some(Sum::Interface(op)) => out.extend(op.args.iter()),
            Some(
                Sum::Var(_)
                | Sum::Val(_)
                | Sum::Builtin(_)
                | Sum::PrimCon(_)
                | Sum::PrimLit(_)
                | Sum::EnumCon(_)
                | Sum::Nil(_)
                | Sum::OptionalNone(_)
                | Sum::Interned(_),
            )
            | None => {}
        }
        out
    }
}

impl Update {
    /// Returns the direct sub-expressions of this update.
    #[must_use]
    pub fn child_exprs(&self) -> Vec<&Expr> {
        use update::Sum;
        let mut out: Vec<&Expr> = Vec::new();
        match &self.sum {
            Some(Sum::Pure(embed) | Sum::LedgerTimeLt(embed) | Sum::EmbedExpr(embed)) => {
                out.extend(embed.expr.as_deref());
            }
            Some(Sum::Block(block)) => out.extend(block_exprs(block)),
            Some(Sum::Create(create) | Sum::CreateInterface(create)) => {
                out.extend(create.expr.as_deref());
            }
            Some(Sum::Exercise(ex) | Sum::DynamicExercise(ex) | Sum::SoftExercise(ex)) => {
                out.extend(ex.cid.as_deref());
                out.extend(ex.arg.as_deref());
            }
            Some(Sum::ExerciseByKey(ex)) => {
                out.extend(ex.key.as_deref());
                out.extend(ex.arg.as_deref());
            }
            Some(Sum::ExerciseInterface(ex)) => {
                out.extend(ex.cid.as_deref());
                out.extend(ex.arg.as_deref());
                out.extend(ex.guard.as_deref());
            }
            Some(Sum::Fetch(fetch) | Sum::SoftFetch(fetch) | Sum::FetchInterface(fetch)) => {
                out.extend(fetch.cid.as_deref());
            }
            Some(Sum::LookupByKey(by_key) | Sum::FetchByKey(by_key)) => {
                out.extend(by_key.key.as_deref());
            }
            Some(Sum::TryCatch(handler)) => {
                out.extend(handler.try_expr.as_deref());
                out.extend(handler.catch_expr.as_deref());
            }
            Some(Sum::GetTime(_)) | None => {}
        }
        out
    }
}

/// Returns the value expressions of a field list.
fn field_exprs(fields: &[FieldWithExpr]) -> impl Iterator<Item = &Expr> {
    fields.iter().filter_map(|field| field.expr.as_ref())
}

/// Returns the bound expressions of a block followed by its body.
fn block_exprs(block: &Block) -> impl Iterator<Item = &Expr> {
    block
        .bindings
        .iter()
        .filter_map(|binding| binding.bound.as_ref())
        .chain(block.body.as_deref())
}
