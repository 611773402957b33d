// daml-sast-core/src/ir/lower.rs
// ============================================================================
// Module: IR Lowering
// Description: Conversion of decoded Daml-LF packages into the analysis IR.
// Purpose: Resolve names, attach references and types, reject malformed input.
// Dependencies: crate::lf
// ============================================================================

//! ## Overview
//! Lowering is a pure function of one decoded package. Names are resolved
//! through [`Resolver`], every produced node receives a unique [`LfRef`], and
//! variable nodes carry the declared type of their binder when one is in
//! scope. Projections of locally declared records are typed from the
//! record's field declarations.
//!
//! Any structural inconsistency (missing variant, out-of-range interned
//! index, name encoding the declared version forbids) aborts lowering of the
//! package with [`ScanError::Lowering`] naming the module and definition.
//!
//! Interned expressions and types are expanded inline. Every lowered node is
//! charged against the proto node limit and every expansion adds a nesting
//! level, so a small table that references itself many times cannot expand
//! past the configured limits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::HardeningLimit;
use crate::error::ScanError;
use crate::ir::model::Binding;
use crate::ir::model::CaseAlt;
use crate::ir::model::Choice;
use crate::ir::model::ChoiceParts;
use crate::ir::model::Expr;
use crate::ir::model::ExprKind;
use crate::ir::model::FieldExpr;
use crate::ir::model::InterfaceOp;
use crate::ir::model::LfRef;
use crate::ir::model::Literal;
use crate::ir::model::Location;
use crate::ir::model::Module;
use crate::ir::model::Package;
use crate::ir::model::Pattern;
use crate::ir::model::Program;
use crate::ir::model::SourceSpan;
use crate::ir::model::Template;
use crate::ir::model::TemplateKey;
use crate::ir::model::Type;
use crate::ir::model::UpdateExpr;
use crate::ir::model::ValueDef;
use crate::ir::model::choice_label;
use crate::ir::model::template_label;
use crate::ir::model::value_label;
use crate::lf::decoder::DecodedPackage;
use crate::lf::limits::ArchiveLimits;
use crate::lf::proto;
use crate::lf::resolve::Resolver;
use crate::lf::resolve::ShapeError;
use crate::lf::resolve::ShapeResult;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Module label used when a module name cannot be resolved.
const UNNAMED_MODULE: &str = "<unnamed>";

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Lowers every package, stopping at the first failure.
///
/// # Errors
///
/// Returns [`ScanError::Lowering`] for the first malformed package and
/// [`ScanError::HardeningLimitExceeded`] for the first oversized one.
pub fn lower_program(
    packages: &[DecodedPackage],
    limits: &ArchiveLimits,
) -> Result<Program, ScanError> {
    let packages = packages
        .iter()
        .map(|package| lower_package(package, limits))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Program {
        packages,
    })
}

/// Lowers one decoded package.
///
/// # Errors
///
/// Returns [`ScanError::Lowering`] when the package is inconsistent with
/// the grammar of its declared version, and
/// [`ScanError::HardeningLimitExceeded`] when expanding interned expressions
/// and types exceeds the proto depth or node limit.
pub fn lower_package(
    decoded: &DecodedPackage,
    limits: &ArchiveLimits,
) -> Result<Package, ScanError> {
    let mut lowerer = Lowerer::new(decoded, *limits);
    lowerer.collect_records()?;
    let mut modules = Vec::with_capacity(decoded.package.modules.len());
    for module in &decoded.package.modules {
        modules.push(lowerer.module(module)?);
    }
    Ok(Package {
        package_id: decoded.package_id.clone(),
        name: decoded.name.clone(),
        version: decoded.package_version.clone(),
        lf_version: decoded.version,
        modules,
        lf_ref: LfRef::root(
            Arc::clone(&lowerer.package_id),
            Arc::from(""),
            Arc::from(""),
            "package",
        ),
    })
}

// ============================================================================
// SECTION: Lowerer
// ============================================================================

/// Per-package lowering state.
struct Lowerer<'a> {
    /// Name resolver for the package.
    resolver: Resolver<'a>,
    /// Raw package.
    package: &'a proto::Package,
    /// Package id shared by every reference.
    package_id: Arc<str>,
    /// Field types of locally declared records, keyed by `Module.Tycon`.
    records: BTreeMap<String, Vec<(String, Type)>>,
    /// Binders in scope, innermost last.
    scope: Vec<(String, Option<Type>)>,
    /// Current expression nesting, interned expansions included.
    depth: u64,
    /// Interned expressions currently being expanded.
    interned_active: Vec<i32>,
    /// Interned types currently being expanded.
    interned_types_active: RefCell<Vec<i32>>,
    /// Structure limits applied to the expanded package.
    limits: ArchiveLimits,
    /// Archive entry reported when a limit is exceeded.
    entry: &'a str,
    /// Expression and type nodes lowered so far.
    nodes: Cell<u64>,
}

impl<'a> Lowerer<'a> {
    /// Creates a lowerer for a decoded package.
    fn new(decoded: &'a DecodedPackage, limits: ArchiveLimits) -> Self {
        Self {
            resolver: Resolver::new(&decoded.package, decoded.version),
            package: &decoded.package,
            package_id: Arc::from(decoded.package_id.as_str()),
            records: BTreeMap::new(),
            scope: Vec::new(),
            depth: 0,
            interned_active: Vec::new(),
            interned_types_active: RefCell::new(Vec::new()),
            limits,
            entry: &decoded.entry,
            nodes: Cell::new(0),
        }
    }

    /// Wraps a shape error with its package, module, and definition.
    fn failure(&self, module: &str, definition: &str, err: ShapeError) -> ScanError {
        match err {
            ShapeError::Limit {
                limit,
                actual,
                max,
            } => ScanError::HardeningLimitExceeded {
                limit,
                subject: self.entry.to_string(),
                actual,
                max,
            },
            ShapeError::Malformed(message) => ScanError::Lowering {
                package_id: self.package_id.to_string(),
                module: module.to_string(),
                definition: definition.to_string(),
                message,
            },
        }
    }

    /// Checks a value against a structure limit.
    fn within(&self, limit: HardeningLimit, actual: u64) -> ShapeResult<()> {
        let max = self.limits.max_for(limit);
        if actual > max {
            return Err(ShapeError::Limit {
                limit,
                actual,
                max,
            });
        }
        Ok(())
    }

    /// Charges one lowered node against the node limit.
    fn charge(&self) -> ShapeResult<()> {
        let nodes = self.nodes.get().saturating_add(1);
        self.nodes.set(nodes);
        self.within(HardeningLimit::ProtoNodes, nodes)
    }

    /// Builds the root reference of a definition slot.
    fn root_ref(&self, module: &Arc<str>, definition: &Arc<str>, slot: &'static str) -> LfRef {
        LfRef::root(Arc::clone(&self.package_id), Arc::clone(module), Arc::clone(definition), slot)
    }

    // ------------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------------

    /// Records the field types of every record declared in the package.
    fn collect_records(&mut self) -> Result<(), ScanError> {
        let package = self.package;
        for module in &package.modules {
            let module_name = self
                .resolver
                .name(module.name.as_ref(), "module name")
                .map_err(|err| self.failure(UNNAMED_MODULE, "module", err))?;
            for data_type in module.data_types.iter().filter(|dt| !dt.record_fields.is_empty()) {
                let tycon = self
                    .resolver
                    .name(data_type.name.as_ref(), "data type name")
                    .map_err(|err| self.failure(&module_name, "data type", err))?;
                let qualified = format!("{module_name}.{tycon}");
                let fields = self
                    .typed_fields(&data_type.record_fields)
                    .map_err(|err| self.failure(&module_name, &format!("Type {qualified}"), err))?;
                self.records.insert(qualified, fields);
            }
        }
        Ok(())
    }

    /// Lowers a module.
    fn module(&mut self, raw: &proto::Module) -> Result<Module, ScanError> {
        let name = self
            .resolver
            .name(raw.name.as_ref(), "module name")
            .map_err(|err| self.failure(UNNAMED_MODULE, "module", err))?;
        let module: Arc<str> = Arc::from(name.as_str());
        let mut templates = Vec::with_capacity(raw.templates.len());
        for template in &raw.templates {
            templates.push(self.template(&module, template)?);
        }
        let mut values = Vec::with_capacity(raw.values.len());
        for value in &raw.values {
            values.push(self.value(&module, value)?);
        }
        Ok(Module {
            lf_ref: LfRef::root(
                Arc::clone(&self.package_id),
                Arc::clone(&module),
                Arc::from(""),
                "module",
            ),
            name,
            templates,
            values,
        })
    }

    /// Lowers a template and its choices.
    fn template(
        &mut self,
        module: &Arc<str>,
        raw: &proto::DefTemplate,
    ) -> Result<Template, ScanError> {
        let tycon = self
            .resolver
            .name(raw.tycon.as_ref(), "template name")
            .map_err(|err| self.failure(module, "Template <unnamed>", err))?;
        let name = format!("{module}.{tycon}");
        let label = template_label(&name);
        let mut template = self
            .template_shell(module, name, raw)
            .map_err(|err| self.failure(module, &label, err))?;
        for raw_choice in &raw.choices {
            let choice = self.choice(module, &template, raw_choice)?;
            template.choices.push(choice);
        }
        Ok(template)
    }

    /// Lowers the template-level parts of a template.
    fn template_shell(
        &mut self,
        module: &Arc<str>,
        name: String,
        raw: &proto::DefTemplate,
    ) -> ShapeResult<Template> {
        let definition: Arc<str> = Arc::from(template_label(&name));
        let mark = self.scope.len();
        let param = self.resolver.ident(raw.param.as_ref(), "template parameter")?;
        self.bind(param.clone(), Some(con_type(&name)));

        let slot = |name: &'static str| self.root_ref(module, &definition, name);
        let signatories_ref = slot("signatories");
        let observers_ref = slot("observers");
        let precond_ref = slot("precond");
        let key_ref = slot("key");
        let template_ref = slot("template");

        let signatories = self.required(raw.signatories.as_ref(), "signatories", signatories_ref)?;
        let observers = self.required(raw.observers.as_ref(), "observers", observers_ref)?;
        let precond = match raw.precond.as_ref() {
            Some(precond) => Some(self.expr(precond, precond_ref)?),
            None => None,
        };
        let key = match raw.key.as_ref() {
            Some(key) => Some(self.key(key, key_ref)?),
            None => None,
        };
        self.scope.truncate(mark);

        Ok(Template {
            lf_ref: template_ref.with_span(span_of(raw.location.as_ref())),
            location: definition_location(module, &definition, raw.location.as_ref()),
            name,
            param,
            signatories,
            observers,
            precond,
            key,
            choices: Vec::new(),
        })
    }

    /// Lowers a contract key.
    fn key(&mut self, raw: &proto::DefKey, lf_ref: LfRef) -> ShapeResult<TemplateKey> {
        let typ = match raw.typ.as_ref() {
            Some(typ) => self.ty(typ)?,
            None => Type::Unknown,
        };
        let body = self.required(raw.body.as_ref(), "key body", lf_ref.child(0))?;
        let maintainers =
            self.required(raw.maintainers.as_ref(), "key maintainers", lf_ref.child(1))?;
        Ok(TemplateKey {
            typ,
            body,
            maintainers,
            lf_ref,
        })
    }

    /// Lowers a choice of a template.
    fn choice(
        &mut self,
        module: &Arc<str>,
        template: &Template,
        raw: &proto::TemplateChoice,
    ) -> Result<Choice, ScanError> {
        let name = self
            .resolver
            .ident(raw.name.as_ref(), "choice name")
            .map_err(|err| self.failure(module, &template_label(&template.name), err))?;
        let label = choice_label(&template.name, &name);
        self.choice_body(module, template, name, raw)
            .map_err(|err| self.failure(module, &label, err))
    }

    /// Lowers the body of a choice with its binders in scope.
    fn choice_body(
        &mut self,
        module: &Arc<str>,
        template: &Template,
        name: String,
        raw: &proto::TemplateChoice,
    ) -> ShapeResult<Choice> {
        let definition: Arc<str> = Arc::from(choice_label(&template.name, &name));
        let mark = self.scope.len();
        self.bind(template.param.clone(), Some(con_type(&template.name)));

        let binder = raw.arg_binder.as_ref().ok_or_else(|| ShapeError::missing("choice argument"))?;
        let arg_binder = self.resolver.ident(binder.var.as_ref(), "choice argument")?;
        let arg_type = match binder.typ.as_ref() {
            Some(typ) => self.ty(typ)?,
            None => Type::Unknown,
        };
        self.bind(arg_binder.clone(), Some(arg_type.clone()));
        let self_binder = self.resolver.optional_ident(raw.self_binder.as_ref(), "self binder")?;
        if let Some(self_binder) = self_binder {
            let cid = Type::Builtin {
                name: "ContractId".to_string(),
                args: vec![con_type(&template.name)],
            };
            self.bind(self_binder, Some(cid));
        }

        let slot = |name: &'static str| self.root_ref(module, &definition, name);
        let (controllers_ref, observers_ref, authorizers_ref, update_ref, choice_ref) = (
            slot("controllers"),
            slot("observers"),
            slot("authorizers"),
            slot("update"),
            slot("choice"),
        );

        let controllers = self.required(raw.controllers.as_ref(), "controllers", controllers_ref)?;
        let observers = match raw.observers.as_ref() {
            Some(expr) => Some(self.expr(expr, observers_ref)?),
            None => None,
        };
        let authorizers = match raw.authorizers.as_ref() {
            Some(expr) => Some(self.expr(expr, authorizers_ref)?),
            None => None,
        };
        let update = self.required(raw.update.as_ref(), "choice update", update_ref)?;
        let return_type = match raw.ret_type.as_ref() {
            Some(typ) => self.ty(typ)?,
            None => Type::Unknown,
        };
        self.scope.truncate(mark);

        Ok(Choice::new(ChoiceParts {
            lf_ref: choice_ref.with_span(span_of(raw.location.as_ref())),
            location: definition_location(module, &definition, raw.location.as_ref()),
            name,
            consuming: raw.consuming,
            controllers,
            observers,
            authorizers,
            arg_binder,
            arg_type,
            return_type,
            update,
        }))
    }

    /// Lowers a top-level value.
    fn value(&mut self, module: &Arc<str>, raw: &proto::DefValue) -> Result<ValueDef, ScanError> {
        let short = self
            .resolver
            .name(raw.name.as_ref(), "value name")
            .map_err(|err| self.failure(module, "Value <unnamed>", err))?;
        let name = format!("{module}.{short}");
        let definition: Arc<str> = Arc::from(value_label(&name));
        let body_ref = self.root_ref(module, &definition, "body");
        let value_ref = self.root_ref(module, &definition, "value");
        let (typ, body) = self
            .value_parts(raw, body_ref)
            .map_err(|err| self.failure(module, &definition, err))?;
        Ok(ValueDef {
            lf_ref: value_ref.with_span(span_of(raw.location.as_ref())),
            location: definition_location(module, &definition, raw.location.as_ref()),
            name,
            typ,
            body,
        })
    }

    /// Lowers the declared type and body of a value.
    fn value_parts(&mut self, raw: &proto::DefValue, body_ref: LfRef) -> ShapeResult<(Type, Expr)> {
        let typ = match raw.typ.as_ref() {
            Some(typ) => self.ty(typ)?,
            None => Type::Unknown,
        };
        let body = self.required(raw.expr.as_ref(), "value body", body_ref)?;
        Ok((typ, body))
    }

    // ------------------------------------------------------------------------
    // Scope
    // ------------------------------------------------------------------------

    /// Brings a binder into scope.
    fn bind(&mut self, name: String, typ: Option<Type>) {
        self.scope.push((name, typ));
    }

    /// Returns the declared type of the innermost binder with this name.
    fn lookup(&self, name: &str) -> Option<Type> {
        self.scope.iter().rev().find(|(bound, _)| bound == name).and_then(|(_, typ)| typ.clone())
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    /// Lowers a required sub-expression.
    fn required(
        &mut self,
        raw: Option<&proto::Expr>,
        what: &str,
        lf_ref: LfRef,
    ) -> ShapeResult<Expr> {
        let raw = raw.ok_or_else(|| ShapeError::missing(what))?;
        self.expr(raw, lf_ref)
    }

    /// Lowers an expression, bounding expanded nesting and node count.
    fn expr(&mut self, raw: &proto::Expr, lf_ref: LfRef) -> ShapeResult<Expr> {
        self.charge()?;
        self.depth += 1;
        let result = self
            .within(HardeningLimit::ProtoDepth, self.depth)
            .and_then(|()| self.expr_node(raw, lf_ref));
        self.depth -= 1;
        result
    }

    /// Lowers one expression node.
    fn expr_node(&mut self, raw: &proto::Expr, lf_ref: LfRef) -> ShapeResult<Expr> {
        use proto::expr::Sum;

        let sum = raw.sum.as_ref().ok_or_else(|| ShapeError::missing("expression variant"))?;
        if let Sum::Interned(index) = sum {
            return self.interned_expr(*index, lf_ref);
        }
        let span = span_of(raw.location.as_ref());
        let lf_ref = lf_ref.with_span(span);
        let (kind, typ) = match sum {
            Sum::Var(ident) => {
                let name = self.resolver.ident(Some(ident), "variable")?;
                let typ = self.lookup(&name);
                (ExprKind::Var(name), typ)
            }
            Sum::Val(qual) => {
                (ExprKind::Val(self.resolver.qualified(Some(qual), "value reference")?), None)
            }
            Sum::Builtin(code) => {
                let builtin = proto::BuiltinFunction::try_from(*code)
                    .map_err(|_| ShapeError::new(format!("unknown builtin function {code}")))?;
                (ExprKind::Builtin(builtin.lf_name().to_string()), None)
            }
            Sum::PrimCon(code) => {
                let con = proto::PrimCon::try_from(*code)
                    .map_err(|_| ShapeError::new(format!("unknown primitive constructor {code}")))?;
                let typ = if con == proto::PrimCon::ConUnit { "Unit" } else { "Bool" };
                (ExprKind::PrimCon(con.ir_name().to_string()), Some(builtin_type(typ)))
            }
            Sum::PrimLit(lit) => self.literal(lit)?,
            Sum::RecCon(rec) => {
                let (tycon, typ) = self.type_con(rec.tycon.as_ref(), "record type")?;
                let fields = self.fields(&rec.fields, &lf_ref)?;
                (
                    ExprKind::RecCon {
                        tycon,
                        fields,
                    },
                    Some(typ),
                )
            }
            Sum::RecProj(proj) => {
                let (tycon, _) = self.type_con(proj.tycon.as_ref(), "record type")?;
                let field = self.resolver.ident(proj.field.as_ref(), "record field")?;
                let record =
                    self.required(proj.record.as_deref(), "record operand", lf_ref.child(0))?;
                let typ = self.field_type(&tycon, &field);
                (
                    ExprKind::RecProj {
                        tycon,
                        field,
                        record: Box::new(record),
                    },
                    typ,
                )
            }
            Sum::RecUpd(upd) => {
                let (tycon, typ) = self.type_con(upd.tycon.as_ref(), "record type")?;
                let field = self.resolver.ident(upd.field.as_ref(), "record field")?;
                let record =
                    self.required(upd.record.as_deref(), "record operand", lf_ref.child(0))?;
                let update =
                    self.required(upd.update.as_deref(), "record update value", lf_ref.child(1))?;
                (
                    ExprKind::RecUpd {
                        tycon,
                        field,
                        record: Box::new(record),
                        update: Box::new(update),
                    },
                    Some(typ),
                )
            }
            Sum::VariantCon(con) => {
                let (tycon, typ) = self.type_con(con.tycon.as_ref(), "variant type")?;
                let variant = self.resolver.ident(con.variant.as_ref(), "variant constructor")?;
                let arg = self.required(con.arg.as_deref(), "variant payload", lf_ref.child(0))?;
                (
                    ExprKind::VariantCon {
                        tycon,
                        variant,
                        arg: Box::new(arg),
                    },
                    Some(typ),
                )
            }
            Sum::EnumCon(con) => {
                let tycon = self.resolver.qualified(con.tycon.as_ref(), "enum type")?;
                let constructor =
                    self.resolver.ident(con.constructor.as_ref(), "enum constructor")?;
                let typ = con_type(&tycon);
                (
                    ExprKind::EnumCon {
                        tycon,
                        constructor,
                    },
                    Some(typ),
                )
            }
            Sum::StructCon(con) => (
                ExprKind::StructCon {
                    fields: self.fields(&con.fields, &lf_ref)?,
                },
                None,
            ),
            Sum::StructProj(proj) => {
                let field = self.resolver.ident(proj.field.as_ref(), "struct field")?;
                let structure =
                    self.required(proj.structure.as_deref(), "struct operand", lf_ref.child(0))?;
                (
                    ExprKind::StructProj {
                        field,
                        structure: Box::new(structure),
                    },
                    None,
                )
            }
            Sum::StructUpd(upd) => {
                let field = self.resolver.ident(upd.field.as_ref(), "struct field")?;
                let structure =
                    self.required(upd.structure.as_deref(), "struct operand", lf_ref.child(0))?;
                let update =
                    self.required(upd.update.as_deref(), "struct update value", lf_ref.child(1))?;
                (
                    ExprKind::StructUpd {
                        field,
                        structure: Box::new(structure),
                        update: Box::new(update),
                    },
                    None,
                )
            }
            Sum::App(app) => {
                let fun = self.required(app.fun.as_deref(), "applied function", lf_ref.child(0))?;
                let mut args = Vec::with_capacity(app.args.len());
                for (index, arg) in app.args.iter().enumerate() {
                    args.push(self.expr(arg, lf_ref.child(index + 1))?);
                }
                (
                    ExprKind::App {
                        fun: Box::new(fun),
                        args,
                    },
                    None,
                )
            }
            Sum::TyApp(app) => {
                let operand_ref = lf_ref.child(0);
                let expr =
                    self.required(app.expr.as_deref(), "type application operand", operand_ref)?;
                let types =
                    app.types.iter().map(|typ| self.ty(typ)).collect::<ShapeResult<Vec<_>>>()?;
                (
                    ExprKind::TyApp {
                        expr: Box::new(expr),
                        types,
                    },
                    None,
                )
            }
            Sum::Abs(abs) => return self.lambda(abs, lf_ref, span),
            Sum::TyAbs(abs) => {
                let params = abs
                    .params
                    .iter()
                    .map(|param| self.resolver.ident(Some(param), "type parameter"))
                    .collect::<ShapeResult<Vec<_>>>()?;
                let body =
                    self.required(abs.body.as_deref(), "type abstraction body", lf_ref.child(0))?;
                (
                    ExprKind::TyAbs {
                        params,
                        body: Box::new(body),
                    },
                    None,
                )
            }
            Sum::Case(case) => {
                let scrutinee =
                    self.required(case.scrut.as_deref(), "case scrutinee", lf_ref.child(0))?;
                let mut alts = Vec::with_capacity(case.alts.len());
                for (index, alt) in case.alts.iter().enumerate() {
                    let mark = self.scope.len();
                    let pattern = self.pattern(alt.pattern.as_ref())?;
                    let body_ref = lf_ref.child(index + 1);
                    let body = self.required(alt.body.as_ref(), "case alternative body", body_ref)?;
                    self.scope.truncate(mark);
                    alts.push(CaseAlt {
                        pattern,
                        body,
                    });
                }
                (
                    ExprKind::Case {
                        scrutinee: Box::new(scrutinee),
                        alts,
                    },
                    None,
                )
            }
            Sum::Let(block) => {
                let (bindings, body) = self.block(block, &lf_ref)?;
                let typ = body.typ.clone();
                (
                    ExprKind::Let {
                        bindings,
                        body: Box::new(body),
                    },
                    typ,
                )
            }
            Sum::Nil(nil) => {
                let elem_type = nil.typ.as_ref().map(|typ| self.ty(typ)).transpose()?;
                let typ = elem_type.clone().map(|elem| Type::List(Box::new(elem)));
                (
                    ExprKind::List {
                        elem_type,
                        items: Vec::new(),
                    },
                    typ,
                )
            }
            Sum::Cons(cons) => self.cons(cons, &lf_ref)?,
            Sum::Update(update) => {
                (ExprKind::Update(Box::new(self.update(update, &lf_ref)?)), None)
            }
            Sum::OptionalNone(none) => {
                let typ = none.typ.as_ref().map(|typ| self.ty(typ)).transpose()?;
                (ExprKind::OptionalNone, typ.map(|inner| Type::Optional(Box::new(inner))))
            }
            Sum::OptionalSome(some) => {
                let typ = some.typ.as_ref().map(|typ| self.ty(typ)).transpose()?;
                let body =
                    self.required(some.body.as_deref(), "optional payload", lf_ref.child(0))?;
                let typ = typ.map(|inner| Type::Optional(Box::new(inner)));
                (ExprKind::OptionalSome(Box::new(body)), typ)
            }
            Sum::ToAny(conv) => {
                let inner = self.required(conv.expr.as_deref(), "to_any operand", lf_ref.child(0))?;
                (ExprKind::ToAny(Box::new(inner)), Some(builtin_type("Any")))
            }
            Sum::FromAny(conv) => {
                let typ = conv.typ.as_ref().map(|typ| self.ty(typ)).transpose()?;
                let inner =
                    self.required(conv.expr.as_deref(), "from_any operand", lf_ref.child(0))?;
                let typ = typ.map(|inner| Type::Optional(Box::new(inner)));
                (ExprKind::FromAny(Box::new(inner)), typ)
            }
            Sum::Throw(throw) => {
                let typ = throw.return_type.as_ref().map(|typ| self.ty(typ)).transpose()?;
                let inner = self.required(
                    throw.exception_expr.as_deref(),
                    "thrown exception",
                    lf_ref.child(0),
                )?;
                (ExprKind::Throw(Box::new(inner)), typ)
            }
            Sum::Interface(op) => {
                let kind = proto::InterfaceOpKind::try_from(op.op)
                    .map_err(|_| {
                        ShapeError::new(format!("unknown interface operation {}", op.op))
                    })?;
                let interface = self.resolver.qualified(op.interface.as_ref(), "interface")?;
                let mut args = Vec::with_capacity(op.args.len());
                for (index, arg) in op.args.iter().enumerate() {
                    args.push(self.expr(arg, lf_ref.child(index))?);
                }
                (
                    ExprKind::Interface {
                        op: interface_op(kind),
                        interface,
                        args,
                    },
                    None,
                )
            }
            Sum::Interned(_) => return Err(ShapeError::new("nested interned expression reference")),
        };
        Ok(Expr {
            kind,
            typ,
            span,
            lf_ref,
        })
    }

    /// Expands an interned expression in place of the referencing node.
    fn interned_expr(&mut self, index: i32, lf_ref: LfRef) -> ShapeResult<Expr> {
        if self.interned_active.contains(&index) {
            return Err(ShapeError::new(format!("cyclic interned expression {index}")));
        }
        let package = self.package;
        let raw = usize::try_from(index)
            .ok()
            .and_then(|slot| package.interned_exprs.get(slot))
            .ok_or_else(|| {
                ShapeError::new(format!("interned expression index {index} out of range"))
            })?;
        self.interned_active.push(index);
        let result = self.expr(raw, lf_ref);
        self.interned_active.pop();
        result
    }

    /// Lowers a multi-parameter lambda into nested single-parameter lambdas.
    fn lambda(
        &mut self,
        abs: &proto::Abs,
        lf_ref: LfRef,
        span: Option<SourceSpan>,
    ) -> ShapeResult<Expr> {
        if abs.params.is_empty() {
            return Err(ShapeError::missing("lambda parameter"));
        }
        let mark = self.scope.len();
        let mut params = Vec::with_capacity(abs.params.len());
        let mut refs = Vec::with_capacity(abs.params.len());
        let mut level_ref = lf_ref;
        for param in &abs.params {
            let name = self.resolver.ident(param.var.as_ref(), "lambda parameter")?;
            let typ = param.typ.as_ref().map(|typ| self.ty(typ)).transpose()?;
            self.bind(name.clone(), typ.clone());
            params.push((name, typ));
            let next = level_ref.child(0);
            refs.push(level_ref);
            level_ref = next;
        }
        let mut current = self.required(abs.body.as_deref(), "lambda body", level_ref)?;
        self.scope.truncate(mark);
        let levels = params.into_iter().zip(refs).enumerate().rev();
        for (level, ((param, param_type), node_ref)) in levels {
            current = Expr {
                kind: ExprKind::Abs {
                    param,
                    param_type,
                    body: Box::new(current),
                },
                typ: None,
                span: if level == 0 { span } else { None },
                lf_ref: node_ref,
            };
        }
        Ok(current)
    }

    /// Lowers a cons, flattening it into a list literal when the tail is one.
    fn cons(
        &mut self,
        cons: &proto::Cons,
        lf_ref: &LfRef,
    ) -> ShapeResult<(ExprKind, Option<Type>)> {
        let elem_type = cons.typ.as_ref().map(|typ| self.ty(typ)).transpose()?;
        let mut front = Vec::with_capacity(cons.front.len());
        for (index, item) in cons.front.iter().enumerate() {
            front.push(self.expr(item, lf_ref.child(index))?);
        }
        let tail =
            self.required(cons.tail.as_deref(), "cons tail", lf_ref.child(cons.front.len()))?;
        let typ = elem_type.clone().map(|elem| Type::List(Box::new(elem)));
        let kind = match tail {
            Expr {
                kind: ExprKind::List {
                    items,
                    ..
                },
                ..
            } => {
                front.extend(items);
                ExprKind::List {
                    elem_type,
                    items: front,
                }
            }
            other => ExprKind::Cons {
                front,
                tail: Box::new(other),
            },
        };
        Ok((kind, typ))
    }

    /// Lowers a primitive literal.
    fn literal(&self, lit: &proto::PrimLit) -> ShapeResult<(ExprKind, Option<Type>)> {
        use proto::prim_lit::Kind;

        let kind = lit.kind.as_ref().ok_or_else(|| ShapeError::missing("literal value"))?;
        Ok(match kind {
            Kind::Int64(value) => {
                (ExprKind::Lit(Literal::Int64(*value)), Some(builtin_type("Int64")))
            }
            Kind::Numeric(text) => (
                ExprKind::Lit(Literal::Numeric(
                    self.resolver.ident(Some(text), "numeric literal")?,
                )),
                Some(builtin_type("Numeric")),
            ),
            Kind::Text(text) => (
                ExprKind::Lit(Literal::Text(self.resolver.ident(Some(text), "text literal")?)),
                Some(builtin_type("Text")),
            ),
            Kind::Timestamp(value) => {
                (ExprKind::Lit(Literal::Timestamp(*value)), Some(builtin_type("Timestamp")))
            }
            Kind::Party(party) => (
                ExprKind::Lit(Literal::Party(self.resolver.ident(Some(party), "party literal")?)),
                Some(Type::Party),
            ),
            Kind::Date(value) => (ExprKind::Lit(Literal::Date(*value)), Some(builtin_type("Date"))),
        })
    }

    /// Lowers named field values; field `i` becomes child `i`.
    fn fields(
        &mut self,
        fields: &[proto::FieldWithExpr],
        lf_ref: &LfRef,
    ) -> ShapeResult<Vec<FieldExpr>> {
        let mut out = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let name = self.resolver.ident(field.field.as_ref(), "field name")?;
            let value = self.required(field.expr.as_ref(), "field value", lf_ref.child(index))?;
            out.push(FieldExpr {
                name,
                value,
            });
        }
        Ok(out)
    }

    /// Lowers a sequence of bindings followed by a body.
    fn block(&mut self, block: &proto::Block, lf_ref: &LfRef) -> ShapeResult<(Vec<Binding>, Expr)> {
        let mark = self.scope.len();
        let mut bindings = Vec::with_capacity(block.bindings.len());
        for (index, binding) in block.bindings.iter().enumerate() {
            let binder = binding.binder.as_ref().ok_or_else(|| ShapeError::missing("binder"))?;
            let name = self.resolver.ident(binder.var.as_ref(), "binder")?;
            let typ = binder.typ.as_ref().map(|typ| self.ty(typ)).transpose()?;
            let bound =
                self.required(binding.bound.as_ref(), "bound expression", lf_ref.child(index))?;
            self.bind(name.clone(), typ.clone().or_else(|| bound.typ.clone()));
            bindings.push(Binding {
                name,
                typ,
                bound,
            });
        }
        let body =
            self.required(block.body.as_deref(), "block body", lf_ref.child(block.bindings.len()))?;
        self.scope.truncate(mark);
        Ok((bindings, body))
    }

    /// Lowers a case pattern and brings its binders into scope.
    fn pattern(&mut self, raw: Option<&proto::case_alt::Pattern>) -> ShapeResult<Pattern> {
        use proto::case_alt::Pattern as Raw;

        let raw = raw.ok_or_else(|| ShapeError::missing("case pattern"))?;
        Ok(match raw {
            Raw::Default(_) => Pattern::Default,
            Raw::Variant(variant) => {
                let tycon = self.resolver.qualified(variant.con.as_ref(), "variant type")?;
                let name = self.resolver.ident(variant.variant.as_ref(), "variant constructor")?;
                let binder = self.resolver.ident(variant.binder.as_ref(), "variant binder")?;
                self.bind(binder.clone(), None);
                Pattern::Variant {
                    tycon,
                    variant: name,
                    binder,
                }
            }
            Raw::PrimCon(code) => {
                let con = proto::PrimCon::try_from(*code)
                    .map_err(|_| ShapeError::new(format!("unknown primitive constructor {code}")))?;
                Pattern::PrimCon(con.ir_name().to_string())
            }
            Raw::Nil(_) => Pattern::Nil,
            Raw::Cons(cons) => {
                let head = self.resolver.ident(cons.head.as_ref(), "cons head binder")?;
                let tail = self.resolver.ident(cons.tail.as_ref(), "cons tail binder")?;
                self.bind(head.clone(), None);
                self.bind(tail.clone(), None);
                Pattern::Cons {
                    head,
                    tail,
                }
            }
            Raw::OptionalNone(_) => Pattern::OptionalNone,
            Raw::OptionalSome(some) => {
                let binder = self.resolver.ident(some.var.as_ref(), "optional binder")?;
                self.bind(binder.clone(), None);
                Pattern::OptionalSome {
                    binder,
                }
            }
            Raw::Enum(pattern) => Pattern::Enum {
                tycon: self.resolver.qualified(pattern.con.as_ref(), "enum type")?,
                constructor: self.resolver.ident(pattern.constructor.as_ref(), "enum constructor")?,
            },
        })
    }

    // ------------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------------

    /// Lowers a ledger update.
    fn update(&mut self, raw: &proto::Update, lf_ref: &LfRef) -> ShapeResult<UpdateExpr> {
        use proto::update::Sum;

        let sum = raw.sum.as_ref().ok_or_else(|| ShapeError::missing("update variant"))?;
        Ok(match sum {
            Sum::Pure(embed) => {
                let value = self.required(embed.expr.as_deref(), "pure value", lf_ref.child(0))?;
                UpdateExpr::Pure(value)
            }
            Sum::Block(block) => {
                let (bindings, body) = self.block(block, lf_ref)?;
                UpdateExpr::Block {
                    bindings,
                    body,
                }
            }
            Sum::Create(create) => UpdateExpr::Create {
                template: self.resolver.qualified(create.template.as_ref(), "created template")?,
                arg: self.required(create.expr.as_deref(), "contract argument", lf_ref.child(0))?,
            },
            Sum::CreateInterface(create) => UpdateExpr::CreateInterface {
                interface: self.resolver.qualified(create.template.as_ref(), "created interface")?,
                arg: self.required(create.expr.as_deref(), "contract argument", lf_ref.child(0))?,
            },
            Sum::Exercise(exercise) => {
                let (template, choice, cid, arg) = self.exercise(exercise, lf_ref)?;
                UpdateExpr::Exercise {
                    template,
                    choice,
                    cid,
                    arg,
                }
            }
            Sum::DynamicExercise(exercise) => {
                let (template, choice, cid, arg) = self.exercise(exercise, lf_ref)?;
                UpdateExpr::DynamicExercise {
                    template,
                    choice,
                    cid,
                    arg,
                }
            }
            Sum::SoftExercise(exercise) => {
                let (template, choice, cid, arg) = self.exercise(exercise, lf_ref)?;
                UpdateExpr::SoftExercise {
                    template,
                    choice,
                    cid,
                    arg,
                }
            }
            Sum::ExerciseByKey(exercise) => UpdateExpr::ExerciseByKey {
                template: self
                    .resolver
                    .qualified(exercise.template.as_ref(), "exercised template")?,
                choice: self.resolver.ident(exercise.choice.as_ref(), "exercised choice")?,
                key: self.required(exercise.key.as_deref(), "contract key", lf_ref.child(0))?,
                arg: self.required(exercise.arg.as_deref(), "choice argument", lf_ref.child(1))?,
            },
            Sum::ExerciseInterface(exercise) => UpdateExpr::ExerciseInterface {
                interface: self
                    .resolver
                    .qualified(exercise.interface.as_ref(), "exercised interface")?,
                choice: self.resolver.ident(exercise.choice.as_ref(), "exercised choice")?,
                cid: self.required(exercise.cid.as_deref(), "contract id", lf_ref.child(0))?,
                arg: self.required(exercise.arg.as_deref(), "choice argument", lf_ref.child(1))?,
                guard: match exercise.guard.as_deref() {
                    Some(guard) => Some(self.expr(guard, lf_ref.child(2))?),
                    None => None,
                },
            },
            Sum::Fetch(fetch) => UpdateExpr::Fetch {
                template: self.resolver.qualified(fetch.template.as_ref(), "fetched template")?,
                cid: self.required(fetch.cid.as_deref(), "contract id", lf_ref.child(0))?,
            },
            Sum::SoftFetch(fetch) => UpdateExpr::SoftFetch {
                template: self.resolver.qualified(fetch.template.as_ref(), "fetched template")?,
                cid: self.required(fetch.cid.as_deref(), "contract id", lf_ref.child(0))?,
            },
            Sum::FetchInterface(fetch) => UpdateExpr::FetchInterface {
                interface: self.resolver.qualified(fetch.template.as_ref(), "fetched interface")?,
                cid: self.required(fetch.cid.as_deref(), "contract id", lf_ref.child(0))?,
            },
            Sum::LookupByKey(by_key) => UpdateExpr::LookupByKey {
                template: self.resolver.qualified(by_key.template.as_ref(), "looked-up template")?,
                key: self.required(by_key.key.as_deref(), "contract key", lf_ref.child(0))?,
            },
            Sum::FetchByKey(by_key) => UpdateExpr::FetchByKey {
                template: self.resolver.qualified(by_key.template.as_ref(), "fetched template")?,
                key: self.required(by_key.key.as_deref(), "contract key", lf_ref.child(0))?,
            },
            Sum::GetTime(_) => UpdateExpr::GetTime,
            Sum::LedgerTimeLt(embed) => UpdateExpr::LedgerTimeLt(self.required(
                embed.expr.as_deref(),
                "ledger time bound",
                lf_ref.child(0),
            )?),
            Sum::EmbedExpr(embed) => UpdateExpr::EmbedExpr(self.required(
                embed.expr.as_deref(),
                "embedded update",
                lf_ref.child(0),
            )?),
            Sum::TryCatch(handler) => {
                let body = self.required(handler.try_expr.as_deref(), "try body", lf_ref.child(0))?;
                let binder = self.resolver.ident(handler.var.as_ref(), "exception binder")?;
                let mark = self.scope.len();
                self.bind(binder.clone(), Some(builtin_type("AnyException")));
                let handler =
                    self.required(handler.catch_expr.as_deref(), "catch handler", lf_ref.child(1))?;
                self.scope.truncate(mark);
                UpdateExpr::TryCatch {
                    body,
                    binder,
                    handler,
                }
            }
        })
    }

    /// Lowers the common parts of an exercise by contract id.
    fn exercise(
        &mut self,
        exercise: &proto::UpdateExercise,
        lf_ref: &LfRef,
    ) -> ShapeResult<(String, String, Expr, Expr)> {
        let template = self.resolver.qualified(exercise.template.as_ref(), "exercised template")?;
        let choice = self.resolver.ident(exercise.choice.as_ref(), "exercised choice")?;
        let cid = self.required(exercise.cid.as_deref(), "contract id", lf_ref.child(0))?;
        let arg = self.required(exercise.arg.as_deref(), "choice argument", lf_ref.child(1))?;
        Ok((template, choice, cid, arg))
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    /// Lowers a type.
    fn ty(&self, raw: &proto::Type) -> ShapeResult<Type> {
        self.ty_at(raw, 1)
    }

    /// Lowers a type at a nesting depth, interned expansions included.
    fn ty_at(&self, raw: &proto::Type, depth: u64) -> ShapeResult<Type> {
        use proto::ty::Sum;

        self.charge()?;
        self.within(HardeningLimit::ProtoDepth, depth)?;
        let inner = depth + 1;
        let sum = raw.sum.as_ref().ok_or_else(|| ShapeError::missing("type variant"))?;
        let args_of = |args: &[proto::Type]| {
            args.iter().map(|arg| self.ty_at(arg, inner)).collect::<ShapeResult<Vec<_>>>()
        };
        Ok(match sum {
            Sum::Var(var) => Type::Var {
                name: self.resolver.ident(var.var.as_ref(), "type variable")?,
                args: args_of(&var.args)?,
            },
            Sum::Con(con) => Type::Con {
                name: self.resolver.qualified(con.tycon.as_ref(), "type constructor")?,
                args: args_of(&con.args)?,
            },
            Sum::Syn(syn) => Type::Syn {
                name: self.resolver.qualified(syn.tysyn.as_ref(), "type synonym")?,
                args: args_of(&syn.args)?,
            },
            Sum::Prim(prim) => {
                let kind = proto::PrimType::try_from(prim.prim)
                    .map_err(|_| ShapeError::new(format!("unknown primitive type {}", prim.prim)))?;
                prim_type(kind, args_of(&prim.args)?)
            }
            Sum::Forall(forall) => {
                let vars = forall
                    .vars
                    .iter()
                    .map(|var| self.resolver.ident(Some(var), "quantified variable"))
                    .collect::<ShapeResult<Vec<_>>>()?;
                let body =
                    forall.body.as_deref().ok_or_else(|| ShapeError::missing("forall body"))?;
                Type::Forall {
                    vars,
                    body: Box::new(self.ty_at(body, inner)?),
                }
            }
            Sum::Struct(structure) => {
                Type::Struct(self.typed_fields_at(&structure.fields, inner)?)
            }
            Sum::Nat(value) => Type::Nat(*value),
            Sum::Interned(index) => self.interned_type(*index, inner)?,
            Sum::App(app) => {
                let lhs =
                    app.lhs.as_deref().ok_or_else(|| ShapeError::missing("type application head"))?;
                let rhs = app
                    .rhs
                    .as_deref()
                    .ok_or_else(|| ShapeError::missing("type application argument"))?;
                apply_type(self.ty_at(lhs, inner)?, self.ty_at(rhs, inner)?)
            }
        })
    }

    /// Expands an interned type in place of the referencing node.
    fn interned_type(&self, index: i32, depth: u64) -> ShapeResult<Type> {
        if self.interned_types_active.borrow().contains(&index) {
            return Err(ShapeError::new(format!("cyclic interned type {index}")));
        }
        let target = usize::try_from(index)
            .ok()
            .and_then(|slot| self.package.interned_types.get(slot))
            .ok_or_else(|| ShapeError::new(format!("interned type index {index} out of range")))?;
        self.interned_types_active.borrow_mut().push(index);
        let result = self.ty_at(target, depth);
        self.interned_types_active.borrow_mut().pop();
        result
    }

    /// Lowers a typed field list.
    fn typed_fields(&self, fields: &[proto::FieldWithType]) -> ShapeResult<Vec<(String, Type)>> {
        self.typed_fields_at(fields, 1)
    }

    /// Lowers a typed field list whose types sit at a nesting depth.
    fn typed_fields_at(
        &self,
        fields: &[proto::FieldWithType],
        depth: u64,
    ) -> ShapeResult<Vec<(String, Type)>> {
        fields
            .iter()
            .map(|field| {
                let name = self.resolver.ident(field.field.as_ref(), "field name")?;
                let typ = field.typ.as_ref().ok_or_else(|| ShapeError::missing("field type"))?;
                Ok((name, self.ty_at(typ, depth)?))
            })
            .collect()
    }

    /// Resolves a type constructor application.
    fn type_con(&self, con: Option<&proto::TypeCon>, what: &str) -> ShapeResult<(String, Type)> {
        let con = con.ok_or_else(|| ShapeError::missing(what))?;
        let name = self.resolver.qualified(con.tycon.as_ref(), what)?;
        let args = con.args.iter().map(|arg| self.ty(arg)).collect::<ShapeResult<Vec<_>>>()?;
        Ok((
            name.clone(),
            Type::Con {
                name,
                args,
            },
        ))
    }

    /// Returns the declared type of a field of a locally declared record.
    fn field_type(&self, tycon: &str, field: &str) -> Option<Type> {
        self.records
            .get(tycon)
            .and_then(|fields| fields.iter().find(|(name, _)| name == field))
            .map(|(_, typ)| typ.clone())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the structural location of a definition.
fn definition_location(
    module: &str,
    definition: &str,
    raw: Option<&proto::Location>,
) -> Option<Location> {
    raw.map(|raw| Location {
        module: module.to_string(),
        definition: definition.to_string(),
        span: span_of(Some(raw)),
    })
}

/// Converts a zero-based raw range into a one-based span.
fn span_of(location: Option<&proto::Location>) -> Option<SourceSpan> {
    let range = location?.range?;
    Some(SourceSpan {
        start_line: one_based(range.start_line)?,
        start_col: one_based(range.start_col)?,
        end_line: one_based(range.end_line)?,
        end_col: one_based(range.end_col)?,
    })
}

/// Shifts a zero-based coordinate to one-based; negative values are dropped.
fn one_based(value: i32) -> Option<u32> {
    u32::try_from(value).ok()?.checked_add(1)
}

/// Returns the nullary constructor type of a qualified name.
fn con_type(name: &str) -> Type {
    Type::Con {
        name: name.to_string(),
        args: Vec::new(),
    }
}

/// Returns a nullary builtin type.
fn builtin_type(name: &str) -> Type {
    Type::Builtin {
        name: name.to_string(),
        args: Vec::new(),
    }
}

/// Builds a primitive type, giving `Party`, `List`, and `Optional` their own variants.
fn prim_type(kind: proto::PrimType, mut args: Vec<Type>) -> Type {
    match kind {
        proto::PrimType::Party if args.is_empty() => Type::Party,
        proto::PrimType::List | proto::PrimType::Optional if args.len() == 1 => match args.pop() {
            Some(inner) if kind == proto::PrimType::List => Type::List(Box::new(inner)),
            Some(inner) => Type::Optional(Box::new(inner)),
            None => Type::Unknown,
        },
        _ => Type::Builtin {
            name: prim_name(kind).to_string(),
            args,
        },
    }
}

/// Applies a type to an argument, saturating `List` and `Optional`.
fn apply_type(lhs: Type, rhs: Type) -> Type {
    match lhs {
        Type::Builtin {
            name,
            args,
        } if args.is_empty() && (name == "List" || name == "Optional") => {
            if name == "List" {
                Type::List(Box::new(rhs))
            } else {
                Type::Optional(Box::new(rhs))
            }
        }
        other => Type::App(Box::new(other), Box::new(rhs)),
    }
}

/// Returns the name of a primitive type.
const fn prim_name(kind: proto::PrimType) -> &'static str {
    match kind {
        proto::PrimType::Unit => "Unit",
        proto::PrimType::Bool => "Bool",
        proto::PrimType::Int64 => "Int64",
        proto::PrimType::Text => "Text",
        proto::PrimType::Timestamp => "Timestamp",
        proto::PrimType::Party => "Party",
        proto::PrimType::List => "List",
        proto::PrimType::Update => "Update",
        proto::PrimType::Date => "Date",
        proto::PrimType::ContractId => "ContractId",
        proto::PrimType::Optional => "Optional",
        proto::PrimType::Arrow => "Arrow",
        proto::PrimType::TextMap => "TextMap",
        proto::PrimType::Numeric => "Numeric",
        proto::PrimType::Any => "Any",
        proto::PrimType::TypeRep => "TypeRep",
        proto::PrimType::GenMap => "GenMap",
        proto::PrimType::AnyException => "AnyException",
        proto::PrimType::BigNumeric => "BigNumeric",
        proto::PrimType::RoundingMode => "RoundingMode",
    }
}

/// Maps a raw interface operation onto the IR.
const fn interface_op(kind: proto::InterfaceOpKind) -> InterfaceOp {
    match kind {
        proto::InterfaceOpKind::ToInterface => InterfaceOp::ToInterface,
        proto::InterfaceOpKind::FromInterface => InterfaceOp::FromInterface,
        proto::InterfaceOpKind::CallInterface => InterfaceOp::CallInterface,
        proto::InterfaceOpKind::ViewInterface => InterfaceOp::ViewInterface,
        proto::InterfaceOpKind::SignatoryInterface => InterfaceOp::SignatoryInterface,
        proto::InterfaceOpKind::ObserverInterface => InterfaceOp::ObserverInterface,
        proto::InterfaceOpKind::InterfaceTemplateTypeRep => InterfaceOp::TemplateTypeRep,
    }
}
