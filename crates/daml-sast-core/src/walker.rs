// daml-sast-core/src/walker.rs
// ============================================================================
// Module: IR Walker
// Description: Deterministic traversal that drives rule hooks.
// Purpose: Visit every IR node in a fixed order and collect rule output.
// Dependencies: crate::ir, crate::rules, crate::findings
// ============================================================================

//! ## Overview
//! The walker visits packages, then modules, then each module's templates in
//! declaration order, then its top-level values. Within a template it calls
//! the template hook and then visits the signatories, observers, precondition,
//! key body and key maintainers expressions; within a choice it calls the
//! choice hook and then visits the controllers, observers, authorizers and
//! update expressions. Expressions are visited pre-order, depth-first.
//!
//! Each node is offered to every rule in registry order. A hook error
//! discards whatever that hook emitted and becomes a
//! [`RuleExecutionWarning`]; traversal continues.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::error::RuleExecutionWarning;
use crate::findings::fingerprint::fingerprint;
use crate::findings::model::Evidence;
use crate::findings::model::Finding;
use crate::ir::model::Expr;
use crate::ir::model::Location;
use crate::ir::model::Module;
use crate::ir::model::Package;
use crate::ir::model::Program;
use crate::ir::model::SourceSpan;
use crate::ir::model::Template;
use crate::ir::model::ValueDef;
use crate::rules::base::Rule;
use crate::rules::base::RuleError;
use crate::rules::base::RuleMeta;

// ============================================================================
// SECTION: Program Index
// ============================================================================

/// Read-only index of top-level values keyed by `<package>:<Module>.<name>`.
#[derive(Debug, Clone, Default)]
pub struct ProgramIndex<'p> {
    /// Values by qualified key.
    values: BTreeMap<String, &'p ValueDef>,
}

impl<'p> ProgramIndex<'p> {
    /// Indexes every top-level value of a program.
    #[must_use]
    pub fn build(program: &'p Program) -> Self {
        let mut values = BTreeMap::new();
        for package in &program.packages {
            for module in &package.modules {
                for value in &module.values {
                    values.insert(format!("{}:{}", package.package_id, value.name), value);
                }
            }
        }
        Self {
            values,
        }
    }

    /// Resolves a value reference made from inside `package_id`.
    ///
    /// Qualified references (`<package>:<Module>.<name>`) resolve as written;
    /// bare ones resolve within `package_id`. Returns the index key with the
    /// value.
    #[must_use]
    pub fn resolve(&self, package_id: &str, name: &str) -> Option<(String, &'p ValueDef)> {
        let key =
            if name.contains(':') { name.to_string() } else { format!("{package_id}:{name}") };
        self.values.get(&key).map(|value| (key, *value))
    }

    /// Returns the number of indexed values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no values are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Where the walker currently is.
#[derive(Debug, Clone)]
pub struct Ctx<'a> {
    /// Current package id.
    package_id: &'a str,
    /// Current module name; empty at package level.
    module: &'a str,
    /// Enclosing template.
    template: Option<&'a str>,
    /// Enclosing choice.
    choice: Option<&'a str>,
    /// Breadcrumb for diagnostics.
    path: String,
    /// Program-wide value index.
    index: &'a ProgramIndex<'a>,
}

impl<'a> Ctx<'a> {
    /// Returns a package-level context.
    #[must_use]
    pub fn for_package(package_id: &'a str, index: &'a ProgramIndex<'a>) -> Self {
        Self {
            package_id,
            module: "",
            template: None,
            choice: None,
            path: format!("package:{package_id}"),
            index,
        }
    }

    /// Returns the context of a module inside this package.
    #[must_use]
    pub fn module(&self, module: &'a str) -> Self {
        self.descend(format!("module:{module}"), |ctx| ctx.module = module)
    }

    /// Returns the context of a template inside this module.
    #[must_use]
    pub fn template(&self, template: &'a str) -> Self {
        self.descend(format!("template:{template}"), |ctx| ctx.template = Some(template))
    }

    /// Returns the context of a choice inside this template.
    #[must_use]
    pub fn choice(&self, choice: &'a str) -> Self {
        self.descend(format!("choice:{choice}"), |ctx| ctx.choice = Some(choice))
    }

    /// Returns the context of a top-level value inside this module.
    #[must_use]
    pub fn value(&self, value: &str) -> Self {
        self.descend(format!("value:{value}"), |_| {})
    }

    /// Clones the context with an extra breadcrumb segment.
    fn descend(&self, segment: String, update: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        next.path.push('/');
        next.path.push_str(&segment);
        update(&mut next);
        next
    }

    /// Returns the current package id.
    #[must_use]
    pub const fn package_id(&self) -> &'a str {
        self.package_id
    }

    /// Returns the current module name.
    #[must_use]
    pub const fn module_name(&self) -> &'a str {
        self.module
    }

    /// Returns the enclosing template name.
    #[must_use]
    pub const fn template_name(&self) -> Option<&'a str> {
        self.template
    }

    /// Returns the enclosing choice name.
    #[must_use]
    pub const fn choice_name(&self) -> Option<&'a str> {
        self.choice
    }

    /// Returns the breadcrumb path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the program-wide value index.
    #[must_use]
    pub const fn index(&self) -> &'a ProgramIndex<'a> {
        self.index
    }

    /// Builds a location in the current module.
    #[must_use]
    pub fn location(&self, definition: String, span: Option<SourceSpan>) -> Location {
        Location {
            module: self.module.to_string(),
            definition,
            span,
        }
    }
}

// ============================================================================
// SECTION: Emission
// ============================================================================

/// A finding before the emitter stamps rule metadata and a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingDraft {
    /// Human-readable message.
    message: String,
    /// Structural location.
    location: Location,
    /// Evidence in emission order.
    evidence: Vec<Evidence>,
    /// Related locations.
    related: Vec<Location>,
    /// Free-form metadata.
    metadata: BTreeMap<String, String>,
}

impl FindingDraft {
    /// Starts a draft.
    #[must_use]
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
            evidence: Vec::new(),
            related: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Appends evidence.
    #[must_use]
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    /// Appends a related location.
    #[must_use]
    pub fn with_related(mut self, location: Location) -> Self {
        self.related.push(location);
        self
    }

    /// Sets a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Sink for one rule's findings at one node.
pub struct Emitter<'a> {
    /// Metadata of the emitting rule.
    meta: &'static RuleMeta,
    /// Package the findings belong to.
    package_id: &'a str,
    /// Shared output buffer.
    findings: &'a mut Vec<Finding>,
}

impl Emitter<'_> {
    /// Returns the metadata of the emitting rule.
    #[must_use]
    pub const fn meta(&self) -> &'static RuleMeta {
        self.meta
    }

    /// Stamps and records a finding.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Fingerprint`] when the finding cannot be
    /// fingerprinted.
    pub fn emit(&mut self, draft: FindingDraft) -> Result<(), RuleError> {
        let meta = self.meta;
        let fingerprint = fingerprint(meta.id, meta.category, &draft.location, &draft.evidence)?;
        self.findings.push(Finding {
            rule_id: meta.id.to_string(),
            title: meta.title.to_string(),
            severity: meta.severity,
            confidence: meta.confidence,
            category: meta.category,
            message: draft.message,
            package_id: self.package_id.to_string(),
            location: draft.location,
            evidence: draft.evidence,
            related: draft.related,
            metadata: draft.metadata,
            fingerprint,
        });
        Ok(())
    }
}

// ============================================================================
// SECTION: Traversal
// ============================================================================

/// Findings and warnings produced by one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutput {
    /// Findings in traversal order.
    pub findings: Vec<Finding>,
    /// Hook failures in traversal order.
    pub warnings: Vec<RuleExecutionWarning>,
}

/// Walks a program, offering every node to every rule.
#[must_use]
pub fn walk_program(program: &Program, rules: &[&dyn Rule]) -> WalkOutput {
    let index = ProgramIndex::build(program);
    let mut walker = Walker {
        rules,
        output: WalkOutput::default(),
    };
    for package in &program.packages {
        walker.package(package, &index);
    }
    walker.output
}

/// Traversal state.
struct Walker<'r> {
    /// Rules in registry order.
    rules: &'r [&'r dyn Rule],
    /// Accumulated output.
    output: WalkOutput,
}

impl Walker<'_> {
    /// Visits a package and its modules.
    fn package(&mut self, package: &Package, index: &ProgramIndex<'_>) {
        let ctx = Ctx::for_package(&package.package_id, index);
        self.dispatch(&ctx, |rule, emit| rule.visit_package(&ctx, package, emit));
        for module in &package.modules {
            self.module(&ctx.module(&module.name), module);
        }
    }

    /// Visits a module, its templates, and its values.
    fn module(&mut self, ctx: &Ctx<'_>, module: &Module) {
        self.dispatch(ctx, |rule, emit| rule.visit_module(ctx, module, emit));
        for template in &module.templates {
            self.template(&ctx.template(&template.name), template);
        }
        for value in &module.values {
            self.expr(&ctx.value(&value.name), &value.body);
        }
    }

    /// Visits a template, its expressions, and its choices.
    fn template(&mut self, ctx: &Ctx<'_>, template: &Template) {
        self.dispatch(ctx, |rule, emit| rule.visit_template(ctx, template, emit));
        self.expr(ctx, &template.signatories);
        self.expr(ctx, &template.observers);
        if let Some(precond) = &template.precond {
            self.expr(ctx, precond);
        }
        if let Some(key) = &template.key {
            self.expr(ctx, &key.body);
            self.expr(ctx, &key.maintainers);
        }
        for choice in &template.choices {
            let choice_ctx = ctx.choice(&choice.name);
            self.dispatch(&choice_ctx, |rule, emit| {
                rule.visit_choice(&choice_ctx, template, choice, emit)
            });
            self.expr(&choice_ctx, &choice.controllers);
            if let Some(observers) = &choice.observers {
                self.expr(&choice_ctx, observers);
            }
            if let Some(authorizers) = &choice.authorizers {
                self.expr(&choice_ctx, authorizers);
            }
            self.expr(&choice_ctx, &choice.update);
        }
    }

    /// Visits an expression tree in pre-order.
    fn expr(&mut self, ctx: &Ctx<'_>, root: &Expr) {
        let mut stack = vec![root];
        while let Some(expr) = stack.pop() {
            self.dispatch(ctx, |rule, emit| rule.visit_expr(ctx, expr, emit));
            stack.extend(expr.children().into_iter().rev());
        }
    }

    /// Runs one hook for every rule, turning failures into warnings.
    fn dispatch<F>(&mut self, ctx: &Ctx<'_>, hook: F)
    where
        F: Fn(&dyn Rule, &mut Emitter<'_>) -> Result<(), RuleError>,
    {
        let rules = self.rules;
        for rule in rules {
            let meta = rule.meta();
            let mark = self.output.findings.len();
            let mut emitter = Emitter {
                meta,
                package_id: ctx.package_id(),
                findings: &mut self.output.findings,
            };
            if let Err(err) = hook(*rule, &mut emitter) {
                self.output.findings.truncate(mark);
                self.output.warnings.push(RuleExecutionWarning {
                    rule_id: meta.id.to_string(),
                    path: ctx.path().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
}
