//! Probescope script processing module
//!
//! This module holds the AST contract consumed from the parser, the
//! semantic validation pass, and the printf format verifier.

pub mod ast;
pub mod format_validator;
pub mod semantic;

// Re-export main types for convenience
pub use format_validator::{FormatError, FormatValidator};
pub use semantic::{
    analyze_program, AnalysisOptions, AnalysisReport, Diagnostic, SemanticAnalyzer, SemanticError,
    Severity,
};
