//! Probescope semantic analyzer
//!
//! Validates tracing-language programs before lowering: resolves every
//! expression to a concrete type, enforces the global-map/local-variable
//! scoping rules, checks builtin calls against their signatures, resolves
//! casts and field accesses against the struct registry, and statically
//! verifies printf format strings. The analyzer only decides validity and
//! annotates types; it never executes anything.
//!
//! Parsing and lowering are external collaborators: callers hand in an
//! already-built [`script::ast::Program`] and a read-only
//! [`probescope_types::TypeRegistry`], and receive the same AST with every
//! expression annotated plus an ordered diagnostic list. Lowering must
//! refuse to run when the error count is nonzero.

pub mod script;

pub use script::ast;
pub use script::{
    analyze_program, AnalysisOptions, AnalysisReport, Diagnostic, FormatError, FormatValidator,
    SemanticAnalyzer, SemanticError, Severity,
};
