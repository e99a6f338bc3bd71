//! Semantic validation pass
//!
//! One analyzer instance validates exactly one program: a silent map-type
//! collection prepass realizes the global forward-reference rule, then a
//! single diagnostic-emitting traversal checks every probe in declaration
//! order. Analysis never stops early - it surfaces as many independent
//! defects as possible in one run, and the diagnostic count is the
//! verdict (0 = accepted).

pub mod builtins;
mod calls;
pub mod diagnostics;
pub mod probes;
mod resolver;
pub mod scope;

pub use builtins::{Builtin, REGISTERS};
pub use diagnostics::{AnalysisReport, Diagnostic, SemanticError, Severity};
pub use probes::ProbeValidator;
pub use scope::{ScopeManager, StorageClass};

use calls::CallPosition;
use crate::script::ast::{Expr, ExprKind, Probe, Program, Statement};
use probescope_types::{SizedType, TypeKind, TypeRegistry};
use tracing::{debug, info};

/// Options for a single analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Dump the annotated AST at debug level after analysis.
    pub dump_ast: bool,
}

/// Analyze `program` against `registry`, annotating every expression node
/// with its resolved type and returning the ordered diagnostics.
///
/// This is the main entry point; lowering must refuse to consume the AST
/// when the returned report's error count is nonzero.
pub fn analyze_program(
    program: &mut Program,
    registry: &TypeRegistry,
    options: &AnalysisOptions,
) -> AnalysisReport {
    debug!(
        "starting semantic analysis of {} probe(s)",
        program.probes.len()
    );

    let report = SemanticAnalyzer::new(registry).analyze(program);

    if options.dump_ast {
        dump_ast(program);
    }
    info!(
        "semantic analysis finished with {} error(s)",
        report.error_count()
    );
    report
}

fn dump_ast(program: &Program) {
    debug!("=== Annotated AST ===");
    for (i, probe) in program.probes.iter().enumerate() {
        debug!(
            "  Probe {}: {} ({} statement(s))",
            i,
            probe.attach_point,
            probe.statements.len()
        );
        for (j, statement) in probe.statements.iter().enumerate() {
            debug!("    Statement {}: {:?}", j, statement);
        }
    }
    debug!("=== End Annotated AST ===");
}

/// The orchestrating state machine over the program AST. Composes the
/// scope manager, probe validator, type resolver, and call validator; the
/// resolver and call-validator methods live in sibling modules as further
/// `impl` blocks on this type.
pub struct SemanticAnalyzer<'a> {
    registry: &'a TypeRegistry,
    scope: ScopeManager,
    probe_validator: ProbeValidator,
    diagnostics: Vec<Diagnostic>,
    /// True during the collection prepass: resolution runs without
    /// reporting diagnostics or annotating nodes.
    quiet: bool,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            scope: ScopeManager::new(),
            probe_validator: ProbeValidator::new(),
            diagnostics: Vec::new(),
            quiet: false,
        }
    }

    /// Run the full pass. Consumes the analyzer: one instance analyzes
    /// exactly one program.
    pub fn analyze(mut self, program: &mut Program) -> AnalysisReport {
        self.collect_map_types(program);
        for probe in &mut program.probes {
            self.analyze_probe(probe);
        }
        AnalysisReport {
            diagnostics: self.diagnostics,
        }
    }

    /// Silent prepass recording each map's first resolvable assignment
    /// type, swept repeatedly until a full sweep learns nothing new. This
    /// is what lets a probe read a map that is only assigned later in the
    /// program; each productive sweep records at least one new map, so the
    /// iteration count is bounded by the number of distinct map names.
    fn collect_map_types(&mut self, program: &mut Program) {
        self.quiet = true;
        loop {
            let known = self.scope.map_count();
            for probe in &mut program.probes {
                self.scope.enter_probe();
                for statement in &mut probe.statements {
                    match statement {
                        Statement::AssignMap { name, value } => {
                            if self.scope.lookup(name, StorageClass::Map).is_some() {
                                continue;
                            }
                            if let Some(ty) =
                                self.resolve_statement_value(value, CallPosition::MapValue)
                            {
                                if !ty.is_none() {
                                    let _ = self.scope.declare_or_check(
                                        name,
                                        StorageClass::Map,
                                        ty,
                                    );
                                }
                            }
                        }
                        Statement::AssignVar { name, value } => {
                            if let Some(ty) =
                                self.resolve_statement_value(value, CallPosition::Expression)
                            {
                                if !ty.is_none() {
                                    let _ = self.scope.declare_or_check(
                                        name,
                                        StorageClass::Variable,
                                        ty,
                                    );
                                }
                            }
                        }
                        Statement::Expr(_) => {}
                    }
                }
            }
            if self.scope.map_count() == known {
                break;
            }
        }
        self.quiet = false;
        debug!("collected types for {} map(s)", self.scope.map_count());
    }

    fn analyze_probe(&mut self, probe: &mut Probe) {
        debug!("analyzing probe {}", probe.attach_point);

        if let Err(err) = self.probe_validator.validate(&probe.attach_point) {
            self.report(err);
        }

        self.scope.enter_probe();

        if let Some(predicate) = &mut probe.predicate {
            if let Some(ty) = self.resolve_expr(predicate) {
                if ty.kind != TypeKind::Integer {
                    self.report(SemanticError::UnsupportedPredicateType(ty));
                }
            }
        }

        for statement in &mut probe.statements {
            self.analyze_statement(statement);
        }
    }

    fn analyze_statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::AssignMap { name, value } => {
                if let Some(ty) = self.resolve_statement_value(value, CallPosition::MapValue) {
                    // A none-typed value (`delete()`, `printf`) neither
                    // declares nor checks the map's type.
                    if !ty.is_none() {
                        if let Err(err) =
                            self.scope.declare_or_check(name, StorageClass::Map, ty)
                        {
                            self.report(err);
                        }
                    }
                }
            }
            Statement::AssignVar { name, value } => {
                if let Some(ty) = self.resolve_statement_value(value, CallPosition::Expression) {
                    if !ty.is_none() {
                        if let Err(err) =
                            self.scope.declare_or_check(name, StorageClass::Variable, ty)
                        {
                            self.report(err);
                        }
                    }
                }
            }
            Statement::Expr(expr) => {
                let _ = self.resolve_statement_value(expr, CallPosition::Statement);
            }
        }
    }

    /// Resolve a statement-level value, routing direct calls through the
    /// call validator with their placement context.
    fn resolve_statement_value(
        &mut self,
        value: &mut Expr,
        position: CallPosition,
    ) -> Option<SizedType> {
        if matches!(value.kind, ExprKind::Call { .. }) {
            self.resolve_call(value, position)
        } else {
            self.resolve_expr(value)
        }
    }

    pub(crate) fn report(&mut self, error: SemanticError) {
        if self.quiet {
            return;
        }
        debug!("diagnostic: {}", error);
        self.diagnostics.push(Diagnostic::error(error));
    }
}
