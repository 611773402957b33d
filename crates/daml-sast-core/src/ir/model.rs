// daml-sast-core/src/ir/model.rs
// ============================================================================
// Module: Analysis IR
// Description: Program tree, closed type and expression grammars, references.
// Purpose: Give rules an analysis-friendly, immutable view of Daml-LF.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The IR is a tree rooted at [`Program`]. Each node owns its children and
//! carries exactly one [`LfRef`] back to the raw node it was lowered from.
//! [`ExprKind`] and [`UpdateExpr`] are closed grammars; ledger-effecting
//! operations live only in [`UpdateExpr`] so a subtree can be tested for
//! ledger access without inspecting function names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::Serializer;

use crate::lf::version::LfVersion;

// ============================================================================
// SECTION: Locations
// ============================================================================

/// One-based source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceSpan {
    /// First line.
    pub start_line: u32,
    /// First column.
    pub start_col: u32,
    /// Last line.
    pub end_line: u32,
    /// Last column.
    pub end_col: u32,
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}:{}", self.start_line, self.start_col, self.end_line, self.end_col)
    }
}

/// Structural location of a finding or definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    /// Module name.
    pub module: String,
    /// Definition label (`Template M.T`, `Choice M.T:C`, `Value M.v`).
    pub definition: String,
    /// Source span, when the archive supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

/// Returns the definition label of a template.
#[must_use]
pub fn template_label(template: &str) -> String {
    format!("Template {template}")
}

/// Returns the definition label of a choice.
#[must_use]
pub fn choice_label(template: &str, choice: &str) -> String {
    format!("Choice {template}:{choice}")
}

/// Returns the definition label of a top-level value.
#[must_use]
pub fn value_label(value: &str) -> String {
    format!("Value {value}")
}

// ============================================================================
// SECTION: References
// ============================================================================

/// Stable reference from an IR node back to its raw Daml-LF node.
///
/// Renders as `pkg:<id>/<module>/<definition>/<slot>@<path>` with an optional
/// `#<span>` suffix. The path is the dotted child-index path from the slot
/// root, so sibling nodes never share a reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LfRef {
    /// Package id.
    package_id: Arc<str>,
    /// Module name.
    module: Arc<str>,
    /// Definition label.
    definition: Arc<str>,
    /// Slot within the definition (`signatories`, `update`, ...).
    slot: Arc<str>,
    /// Dotted child-index path; empty at the slot root.
    path: String,
    /// Source span of the node, when present.
    span: Option<SourceSpan>,
}

impl LfRef {
    /// Creates the root reference of a definition slot.
    #[must_use]
    pub fn root(
        package_id: Arc<str>,
        module: Arc<str>,
        definition: Arc<str>,
        slot: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            package_id,
            module,
            definition,
            slot: slot.into(),
            path: String::new(),
            span: None,
        }
    }

    /// Returns the reference of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let path = if self.path.is_empty() {
            index.to_string()
        } else {
            format!("{}.{index}", self.path)
        };
        Self {
            package_id: Arc::clone(&self.package_id),
            module: Arc::clone(&self.module),
            definition: Arc::clone(&self.definition),
            slot: Arc::clone(&self.slot),
            path,
            span: None,
        }
    }

    /// Returns a reference to another slot of the same definition.
    #[must_use]
    pub fn slot(&self, slot: impl Into<Arc<str>>) -> Self {
        Self::root(
            Arc::clone(&self.package_id),
            Arc::clone(&self.module),
            Arc::clone(&self.definition),
            slot,
        )
    }

    /// Attaches a source span.
    #[must_use]
    pub fn with_span(mut self, span: Option<SourceSpan>) -> Self {
        self.span = span;
        self
    }

    /// Returns the package id.
    #[must_use]
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// Returns the module name.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the definition label.
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Option<SourceSpan> {
        self.span
    }

    /// Returns the package- and span-independent part of the reference.
    #[must_use]
    pub fn structural_key(&self) -> String {
        if self.path.is_empty() {
            format!("{}/{}/{}", self.module, self.definition, self.slot)
        } else {
            format!("{}/{}/{}@{}", self.module, self.definition, self.slot, self.path)
        }
    }
}

impl fmt::Display for LfRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg:{}/{}", self.package_id, self.structural_key())?;
        if let Some(span) = self.span {
            write!(f, "#{span}")?;
        }
        Ok(())
    }
}

impl Serialize for LfRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SECTION: Program Tree
// ============================================================================

/// Ordered packages of one archive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// Packages in archive enumeration order.
    pub packages: Vec<Package>,
}

/// A lowered package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package id.
    pub package_id: String,
    /// Package name from metadata.
    pub name: Option<String>,
    /// Package version from metadata.
    pub version: Option<String>,
    /// Declared Daml-LF version.
    pub lf_version: LfVersion,
    /// Modules in declaration order.
    pub modules: Vec<Module>,
    /// Reference to the raw package.
    pub lf_ref: LfRef,
}

/// A lowered module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Dotted module name.
    pub name: String,
    /// Templates in declaration order.
    pub templates: Vec<Template>,
    /// Top-level values in declaration order.
    pub values: Vec<ValueDef>,
    /// Reference to the raw module.
    pub lf_ref: LfRef,
}

/// A lowered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Qualified name (`Module.Tycon`).
    pub name: String,
    /// Binder of the contract argument.
    pub param: String,
    /// Signatory expression.
    pub signatories: Expr,
    /// Observer expression.
    pub observers: Expr,
    /// Precondition expression.
    pub precond: Option<Expr>,
    /// Contract key.
    pub key: Option<TemplateKey>,
    /// Choices in declaration order.
    pub choices: Vec<Choice>,
    /// Source location.
    pub location: Option<Location>,
    /// Reference to the raw template.
    pub lf_ref: LfRef,
}

/// A lowered contract key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateKey {
    /// Key type.
    pub typ: Type,
    /// Key body expression.
    pub body: Expr,
    /// Maintainer expression.
    pub maintainers: Expr,
    /// Reference to the raw key.
    pub lf_ref: LfRef,
}

/// A lowered choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Choice name.
    pub name: String,
    /// Whether exercising archives the contract; fixed at lowering.
    consuming: bool,
    /// Controller expression.
    pub controllers: Expr,
    /// Choice observer expression.
    pub observers: Option<Expr>,
    /// Choice authorizer expression.
    pub authorizers: Option<Expr>,
    /// Binder of the choice argument.
    pub arg_binder: String,
    /// Declared argument type.
    pub arg_type: Type,
    /// Declared return type.
    pub return_type: Type,
    /// Update body.
    pub update: Expr,
    /// Source location.
    pub location: Option<Location>,
    /// Reference to the raw choice.
    pub lf_ref: LfRef,
}

/// Components of a [`Choice`] assembled during lowering.
#[derive(Debug, Clone)]
pub struct ChoiceParts {
    /// Choice name.
    pub name: String,
    /// Whether exercising archives the contract.
    pub consuming: bool,
    /// Controller expression.
    pub controllers: Expr,
    /// Choice observer expression.
    pub observers: Option<Expr>,
    /// Choice authorizer expression.
    pub authorizers: Option<Expr>,
    /// Binder of the choice argument.
    pub arg_binder: String,
    /// Declared argument type.
    pub arg_type: Type,
    /// Declared return type.
    pub return_type: Type,
    /// Update body.
    pub update: Expr,
    /// Source location.
    pub location: Option<Location>,
    /// Reference to the raw choice.
    pub lf_ref: LfRef,
}

impl Choice {
    /// Builds a choice from its parts.
    #[must_use]
    pub fn new(parts: ChoiceParts) -> Self {
        Self {
            name: parts.name,
            consuming: parts.consuming,
            controllers: parts.controllers,
            observers: parts.observers,
            authorizers: parts.authorizers,
            arg_binder: parts.arg_binder,
            arg_type: parts.arg_type,
            return_type: parts.return_type,
            update: parts.update,
            location: parts.location,
            lf_ref: parts.lf_ref,
        }
    }

    /// Returns true when exercising the choice archives the contract.
    #[must_use]
    pub const fn consuming(&self) -> bool {
        self.consuming
    }
}

/// A lowered top-level value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDef {
    /// Qualified name (`Module.name`).
    pub name: String,
    /// Declared type.
    pub typ: Type,
    /// Body expression.
    pub body: Expr,
    /// Source location.
    pub location: Option<Location>,
    /// Reference to the raw value.
    pub lf_ref: LfRef,
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Closed type grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Type variable application.
    Var {
        /// Variable name.
        name: String,
        /// Arguments.
        args: Vec<Type>,
    },
    /// Type constructor application.
    Con {
        /// Qualified constructor name.
        name: String,
        /// Arguments.
        args: Vec<Type>,
    },
    /// Type synonym application.
    Syn {
        /// Qualified synonym name.
        name: String,
        /// Arguments.
        args: Vec<Type>,
    },
    /// Builtin type other than the ones with dedicated variants.
    Builtin {
        /// Builtin name.
        name: String,
        /// Arguments.
        args: Vec<Type>,
    },
    /// `Party`.
    Party,
    /// `List a`.
    List(Box<Type>),
    /// `Optional a`.
    Optional(Box<Type>),
    /// Binary type application.
    App(Box<Type>, Box<Type>),
    /// Structural record.
    Struct(Vec<(String, Type)>),
    /// Universal quantification.
    Forall {
        /// Bound variables.
        vars: Vec<String>,
        /// Body.
        body: Box<Type>,
    },
    /// Type-level natural.
    Nat(i64),
    /// Type could not be determined.
    Unknown,
}

impl Type {
    /// Returns true for `Party`.
    #[must_use]
    pub const fn is_party(&self) -> bool {
        matches!(self, Self::Party)
    }

    /// Returns true for `List Party`.
    #[must_use]
    pub fn is_party_list(&self) -> bool {
        matches!(self, Self::List(inner) if inner.is_party())
    }
}

// ============================================================================
// SECTION: Expressions
// ============================================================================

/// A lowered expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    /// Expression variant.
    pub kind: ExprKind,
    /// Type, when known from binders or record declarations.
    pub typ: Option<Type>,
    /// Source span, when the archive supplied one.
    pub span: Option<SourceSpan>,
    /// Reference to the raw node.
    pub lf_ref: LfRef,
}

/// Primitive literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Party literal.
    Party(String),
    /// Text literal.
    Text(String),
    /// 64-bit integer.
    Int64(i64),
    /// Numeric literal in its textual form.
    Numeric(String),
    /// Timestamp in microseconds since epoch.
    Timestamp(i64),
    /// Date in days since epoch.
    Date(i32),
}

/// Named field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpr {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: Expr,
}

/// Let or block binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Bound variable.
    pub name: String,
    /// Declared type.
    pub typ: Option<Type>,
    /// Bound expression.
    pub bound: Expr,
}

/// Case pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Wildcard.
    Default,
    /// Variant constructor with binder.
    Variant {
        /// Qualified variant type.
        tycon: String,
        /// Constructor name.
        variant: String,
        /// Binder of the payload.
        binder: String,
    },
    /// Primitive constructor (`True`, `False`, `Unit`).
    PrimCon(String),
    /// Empty list.
    Nil,
    /// Non-empty list.
    Cons {
        /// Head binder.
        head: String,
        /// Tail binder.
        tail: String,
    },
    /// Empty optional.
    OptionalNone,
    /// Present optional.
    OptionalSome {
        /// Payload binder.
        binder: String,
    },
    /// Enum constructor.
    Enum {
        /// Qualified enum type.
        tycon: String,
        /// Constructor name.
        constructor: String,
    },
}

/// Case alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseAlt {
    /// Pattern.
    pub pattern: Pattern,
    /// Body.
    pub body: Expr,
}

/// Interface operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceOp {
    /// Template value to interface value.
    ToInterface,
    /// Interface value to template value.
    FromInterface,
    /// Interface method call.
    CallInterface,
    /// Interface view.
    ViewInterface,
    /// Interface signatories.
    SignatoryInterface,
    /// Interface observers.
    ObserverInterface,
    /// Template type representation of an interface value.
    TemplateTypeRep,
}

/// Closed expression grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Local variable.
    Var(String),
    /// Top-level value reference (`Module.name` or `pkg:Module.name`).
    Val(String),
    /// Builtin function.
    Builtin(String),
    /// Primitive constructor.
    PrimCon(String),
    /// Literal.
    Lit(Literal),
    /// Record construction.
    RecCon {
        /// Qualified record type.
        tycon: String,
        /// Field values.
        fields: Vec<FieldExpr>,
    },
    /// Record field projection.
    RecProj {
        /// Qualified record type.
        tycon: String,
        /// Projected field.
        field: String,
        /// Record operand.
        record: Box<Expr>,
    },
    /// Record field update.
    RecUpd {
        /// Qualified record type.
        tycon: String,
        /// Updated field.
        field: String,
        /// Record operand.
        record: Box<Expr>,
        /// New field value.
        update: Box<Expr>,
    },
    /// Variant construction.
    VariantCon {
        /// Qualified variant type.
        tycon: String,
        /// Constructor name.
        variant: String,
        /// Payload.
        arg: Box<Expr>,
    },
    /// Enum construction.
    EnumCon {
        /// Qualified enum type.
        tycon: String,
        /// Constructor name.
        constructor: String,
    },
    /// Struct construction.
    StructCon {
        /// Field values.
        fields: Vec<FieldExpr>,
    },
    /// Struct field projection.
    StructProj {
        /// Projected field.
        field: String,
        /// Struct operand.
        structure: Box<Expr>,
    },
    /// Struct field update.
    StructUpd {
        /// Updated field.
        field: String,
        /// Struct operand.
        structure: Box<Expr>,
        /// New field value.
        update: Box<Expr>,
    },
    /// Function application.
    App {
        /// Function.
        fun: Box<Expr>,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// Type application.
    TyApp {
        /// Polymorphic expression.
        expr: Box<Expr>,
        /// Type arguments.
        types: Vec<Type>,
    },
    /// Single-parameter lambda.
    Abs {
        /// Parameter name.
        param: String,
        /// Parameter type.
        param_type: Option<Type>,
        /// Body.
        body: Box<Expr>,
    },
    /// Type abstraction.
    TyAbs {
        /// Type parameters.
        params: Vec<String>,
        /// Body.
        body: Box<Expr>,
    },
    /// Case analysis.
    Case {
        /// Scrutinee.
        scrutinee: Box<Expr>,
        /// Alternatives in declaration order.
        alts: Vec<CaseAlt>,
    },
    /// Sequential let bindings.
    Let {
        /// Bindings in order.
        bindings: Vec<Binding>,
        /// Body.
        body: Box<Expr>,
    },
    /// List literal (flattened cons chain ending in nil).
    List {
        /// Element type.
        elem_type: Option<Type>,
        /// Elements.
        items: Vec<Expr>,
    },
    /// Cons onto a non-literal tail.
    Cons {
        /// Prepended elements.
        front: Vec<Expr>,
        /// Tail.
        tail: Box<Expr>,
    },
    /// `None`.
    OptionalNone,
    /// `Some`.
    OptionalSome(Box<Expr>),
    /// Conversion to `Any`.
    ToAny(Box<Expr>),
    /// Conversion from `Any`.
    FromAny(Box<Expr>),
    /// Exception throw.
    Throw(Box<Expr>),
    /// Interface operation.
    Interface {
        /// Operation.
        op: InterfaceOp,
        /// Qualified interface name.
        interface: String,
        /// Operands.
        args: Vec<Expr>,
    },
    /// Ledger update.
    Update(Box<UpdateExpr>),
}

/// Ledger-effecting operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateExpr {
    /// Pure value lifted into an update.
    Pure(Expr),
    /// Monadic bind block.
    Block {
        /// Bindings in order.
        bindings: Vec<Binding>,
        /// Final update.
        body: Expr,
    },
    /// Template contract creation.
    Create {
        /// Qualified template name.
        template: String,
        /// Contract argument.
        arg: Expr,
    },
    /// Interface contract creation.
    CreateInterface {
        /// Qualified interface name.
        interface: String,
        /// Contract argument.
        arg: Expr,
    },
    /// Choice exercise by contract id.
    Exercise {
        /// Qualified template name.
        template: String,
        /// Choice name.
        choice: String,
        /// Contract id.
        cid: Expr,
        /// Choice argument.
        arg: Expr,
    },
    /// Choice exercise by contract key.
    ExerciseByKey {
        /// Qualified template name.
        template: String,
        /// Choice name.
        choice: String,
        /// Contract key.
        key: Expr,
        /// Choice argument.
        arg: Expr,
    },
    /// Interface choice exercise.
    ExerciseInterface {
        /// Qualified interface name.
        interface: String,
        /// Choice name.
        choice: String,
        /// Contract id.
        cid: Expr,
        /// Choice argument.
        arg: Expr,
        /// Optional guard predicate.
        guard: Option<Expr>,
    },
    /// Exercise without static template checking.
    DynamicExercise {
        /// Qualified template name.
        template: String,
        /// Choice name.
        choice: String,
        /// Contract id.
        cid: Expr,
        /// Choice argument.
        arg: Expr,
    },
    /// Exercise tolerating template upgrades.
    SoftExercise {
        /// Qualified template name.
        template: String,
        /// Choice name.
        choice: String,
        /// Contract id.
        cid: Expr,
        /// Choice argument.
        arg: Expr,
    },
    /// Contract fetch by id.
    Fetch {
        /// Qualified template name.
        template: String,
        /// Contract id.
        cid: Expr,
    },
    /// Fetch tolerating template upgrades.
    SoftFetch {
        /// Qualified template name.
        template: String,
        /// Contract id.
        cid: Expr,
    },
    /// Interface fetch by id.
    FetchInterface {
        /// Qualified interface name.
        interface: String,
        /// Contract id.
        cid: Expr,
    },
    /// Key lookup.
    LookupByKey {
        /// Qualified template name.
        template: String,
        /// Contract key.
        key: Expr,
    },
    /// Fetch by key.
    FetchByKey {
        /// Qualified template name.
        template: String,
        /// Contract key.
        key: Expr,
    },
    /// Read the ledger time.
    GetTime,
    /// Compare the ledger time against a bound.
    LedgerTimeLt(Expr),
    /// Embedded update expression.
    EmbedExpr(Expr),
    /// Exception handler.
    TryCatch {
        /// Protected update.
        body: Expr,
        /// Exception binder.
        binder: String,
        /// Handler.
        handler: Expr,
    },
}

impl Expr {
    /// Returns the direct children in traversal order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        let mut out: Vec<&Self> = Vec::new();
        match &self.kind {
            ExprKind::RecCon {
                fields,
                ..
            }
            | ExprKind::StructCon {
                fields,
            } => out.extend(fields.iter().map(|field| &field.value)),
            ExprKind::RecProj {
                record: inner,
                ..
            }
            | ExprKind::StructProj {
                structure: inner,
                ..
            }
            | ExprKind::VariantCon {
                arg: inner,
                ..
            }
            | ExprKind::TyApp {
                expr: inner,
                ..
            }
            | ExprKind::Abs {
                body: inner,
                ..
            }
            | ExprKind::TyAbs {
                body: inner,
                ..
            }
            | ExprKind::OptionalSome(inner)
            | ExprKind::ToAny(inner)
            | ExprKind::FromAny(inner)
            | ExprKind::Throw(inner) => out.push(inner),
            ExprKind::RecUpd {
                record: target,
                update,
                ..
            }
            | ExprKind::StructUpd {
                structure: target,
                update,
                ..
            } => {
                out.push(target);
                out.push(update);
            }
            ExprKind::App {
                fun,
                args,
            } => {
                out.push(fun);
                out.extend(args.iter());
            }
            ExprKind::Case {
                scrutinee,
                alts,
            } => {
                out.push(scrutinee);
                out.extend(alts.iter().map(|alt| &alt.body));
            }
            ExprKind::Let {
                bindings,
                body,
            } => {
                out.extend(bindings.iter().map(|binding| &binding.bound));
                out.push(body);
            }
            ExprKind::List {
                items,
                ..
            } => out.extend(items.iter()),
            ExprKind::Cons {
                front,
                tail,
            } => {
                out.extend(front.iter());
                out.push(tail);
            }
            ExprKind::Interface {
                args,
                ..
            } => out.extend(args.iter()),
            ExprKind::Update(update) => out.extend(update.children()),
            ExprKind::Var(_)
            | ExprKind::Val(_)
            | ExprKind::Builtin(_)
            | ExprKind::PrimCon(_)
            | ExprKind::Lit(_)
            | ExprKind::EnumCon {
                ..
            }
            | ExprKind::OptionalNone => {}
        }
        out
    }

    /// Returns the update node when this expression is a ledger update.
    #[must_use]
    pub fn as_update(&self) -> Option<&UpdateExpr> {
        match &self.kind {
            ExprKind::Update(update) => Some(update),
            _ => None,
        }
    }

    /// Returns true when any node in this subtree reads or writes the ledger.
    #[must_use]
    pub fn touches_ledger(&self) -> bool {
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            if expr.as_update().is_some_and(UpdateExpr::is_ledger_op) {
                return true;
            }
            stack.extend(expr.children());
        }
        false
    }
}

impl UpdateExpr {
    /// Returns the direct children in traversal order.
    #[must_use]
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Pure(inner) | Self::LedgerTimeLt(inner) | Self::EmbedExpr(inner) => vec![inner],
            Self::Block {
                bindings,
                body,
            } => {
                bindings.iter().map(|binding| &binding.bound).chain(std::iter::once(body)).collect()
            }
            Self::Create {
                arg,
                ..
            }
            | Self::CreateInterface {
                arg,
                ..
            } => vec![arg],
            Self::Exercise {
                cid,
                arg,
                ..
            }
            | Self::DynamicExercise {
                cid,
                arg,
                ..
            }
            | Self::SoftExercise {
                cid,
                arg,
                ..
            } => vec![cid, arg],
            Self::ExerciseByKey {
                key,
                arg,
                ..
            } => vec![key, arg],
            Self::ExerciseInterface {
                cid,
                arg,
                guard,
                ..
            } => {
                let mut out = vec![cid, arg];
                out.extend(guard.iter());
                out
            }
            Self::Fetch {
                cid,
                ..
            }
            | Self::SoftFetch {
                cid,
                ..
            }
            | Self::FetchInterface {
                cid,
                ..
            } => vec![cid],
            Self::LookupByKey {
                key,
                ..
            }
            | Self::FetchByKey {
                key,
                ..
            } => vec![key],
            Self::TryCatch {
                body,
                handler,
                ..
            } => vec![body, handler],
            Self::GetTime => Vec::new(),
        }
    }

    /// Returns true for operations that read or write the ledger.
    #[must_use]
    pub const fn is_ledger_op(&self) -> bool {
        !matches!(
            self,
            Self::Pure(_)
                | Self::Block {
                    ..
                }
                | Self::EmbedExpr(_)
                | Self::TryCatch {
                    ..
                }
        )
    }

    /// Returns the stable label of the update variant.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Pure(_) => "pure",
            Self::Block {
                ..
            } => "block",
            Self::Create {
                ..
            } => "create",
            Self::CreateInterface {
                ..
            } => "create_interface",
            Self::Exercise {
                ..
            } => "exercise",
            Self::ExerciseByKey {
                ..
            } => "exercise_by_key",
            Self::ExerciseInterface {
                ..
            } => "exercise_interface",
            Self::DynamicExercise {
                ..
            } => "dynamic_exercise",
            Self::SoftExercise {
                ..
            } => "soft_exercise",
            Self::Fetch {
                ..
            } => "fetch",
            Self::SoftFetch {
                ..
            } => "soft_fetch",
            Self::FetchInterface {
                ..
            } => "fetch_interface",
            Self::LookupByKey {
                ..
            } => "lookup_by_key",
            Self::FetchByKey {
                ..
            } => "fetch_by_key",
            Self::GetTime => "get_time",
            Self::LedgerTimeLt(_) => "ledger_time_lt",
            Self::EmbedExpr(_) => "embed_expr",
            Self::TryCatch {
                ..
            } => "try_catch",
        }
    }
}
