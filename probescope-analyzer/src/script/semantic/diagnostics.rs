//! Semantic diagnostics
//!
//! All defects the validation pass can report, as one structured error
//! enum, plus the ordered report the analyzer returns. Every diagnostic is
//! local and non-fatal: the analyzer collects and continues so a single
//! run surfaces as many independent defects as possible.

use crate::script::format_validator::FormatError;
use probescope_types::SizedType;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("{0}")]
    InvalidProbeSpecifier(String),

    #[error("there can only be one {0} probe per program")]
    DuplicateLifecycleProbe(&'static str),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function}() requires {expected} ({actual} provided)")]
    ArityMismatch {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("{function}() {message}")]
    ArgumentType {
        function: &'static str,
        message: String,
    },

    #[error("unknown struct type: {0}")]
    UnknownType(String),

    #[error("reg(): unknown register: {0}")]
    UnknownRegister(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("struct {struct_name} has no field named {field}")]
    FieldNotFound { struct_name: String, field: String },

    #[error("cannot access field '{field}' on value of type {receiver}{hint}")]
    WrongFieldAccessOperator {
        field: String,
        receiver: SizedType,
        /// "; use '->'" when a pointer receiver was accessed with '.', and
        /// vice versa; empty for non-struct receivers.
        hint: &'static str,
    },

    #[error("cannot dereference value of type {0}")]
    InvalidDereference(SizedType),

    #[error("type mismatch for {name}: trying to assign value of type {new} when {name} already has type {existing}")]
    ReassignmentTypeMismatch {
        /// Sigil-decorated name (`@x` or `$x`).
        name: String,
        existing: SizedType,
        new: SizedType,
    },

    #[error("variable {0} used before it was assigned")]
    UseBeforeAssign(String),

    #[error("invalid probe predicate type: {0} (predicates must evaluate to an integer)")]
    UnsupportedPredicateType(SizedType),

    #[error("undefined map: {0}")]
    UndefinedMap(String),

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("type mismatch for '{op}': comparing {left} with {right}")]
    BinaryTypeMismatch {
        op: &'static str,
        left: SizedType,
        right: SizedType,
    },

    #[error("{0}() should be assigned directly to a map")]
    MisplacedCall(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One reported defect. Diagnostics keep the structured error so callers
/// can match on the kind; `Display` renders the user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: SemanticError,
}

impl Diagnostic {
    pub fn error(error: SemanticError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.error),
            Severity::Warning => write!(f, "warning: {}", self.error),
        }
    }
}

/// Outcome of a full analysis run: the ordered diagnostics. A zero error
/// count is the sole success signal.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Iterate the errors' structured kinds, for callers that dispatch on
    /// defect category rather than message text.
    pub fn errors(&self) -> impl Iterator<Item = &SemanticError> {
        self.diagnostics.iter().map(|d| &d.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_renders_severity_and_message() {
        let diag = Diagnostic::error(SemanticError::UndefinedMap("@missing".into()));
        assert_eq!(diag.to_string(), "error: undefined map: @missing");
        assert_eq!(diag.message(), "undefined map: @missing");
    }

    #[test]
    fn format_errors_convert_transparently() {
        let err: SemanticError = FormatError::UnknownConversion('q').into();
        assert_eq!(err.to_string(), "printf: Unknown format string token: %q");
    }

    #[test]
    fn report_counts_only_errors() {
        let mut report = AnalysisReport::default();
        assert!(report.is_ok());
        report
            .diagnostics
            .push(Diagnostic::error(SemanticError::UnknownFunction("f".into())));
        assert_eq!(report.error_count(), 1);
        assert!(!report.is_ok());
    }
}
