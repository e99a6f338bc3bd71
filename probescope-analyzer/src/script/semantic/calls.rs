//! Builtin call validation
//!
//! Checks every call against the closed signature table: arity bounds,
//! per-argument type rules, and placement constraints (the aggregation
//! builtins only make sense as the value of a map assignment). `printf`
//! delegates its template/argument matching to the format verifier.

use super::builtins::{is_register, Builtin};
use super::diagnostics::SemanticError;
use super::SemanticAnalyzer;
use crate::script::ast::{Expr, ExprKind};
use crate::script::format_validator::FormatValidator;
use probescope_types::{SizedType, TypeKind, STRING_SIZE};

/// Where a call appears; the placement rules depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallPosition {
    /// Direct value of a map assignment.
    MapValue,
    /// Bare statement.
    Statement,
    /// Anywhere else: inside a larger expression, a predicate, or the
    /// value of a variable assignment.
    Expression,
}

impl SemanticAnalyzer<'_> {
    /// Validate a call expression and resolve its result type, memoizing
    /// on the node like any other expression.
    pub(crate) fn resolve_call(
        &mut self,
        expr: &mut Expr,
        position: CallPosition,
    ) -> Option<SizedType> {
        if let Some(ty) = &expr.ty {
            return Some(ty.clone());
        }
        let ty = match &mut expr.kind {
            ExprKind::Call { function, args } => self.validate_call(function, args, position),
            _ => return self.resolve_expr(expr),
        }?;
        if !self.quiet {
            expr.ty = Some(ty.clone());
        }
        Some(ty)
    }

    fn validate_call(
        &mut self,
        function: &str,
        args: &mut [Expr],
        position: CallPosition,
    ) -> Option<SizedType> {
        let Some(builtin) = Builtin::from_name(function) else {
            self.report(SemanticError::UnknownFunction(function.to_string()));
            return None;
        };

        if builtin.map_value_only() && position != CallPosition::MapValue {
            self.report(SemanticError::MisplacedCall(builtin.name()));
            return None;
        }

        let (min, max) = builtin.arity();
        let actual = args.len();
        if actual < min || max.is_some_and(|m| actual > m) {
            self.report(SemanticError::ArityMismatch {
                function: builtin.name(),
                expected: builtin.arity_phrase(),
                actual,
            });
            return None;
        }

        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args.iter_mut() {
            arg_types.push(self.resolve_expr(arg)?);
        }

        match builtin {
            Builtin::Quantize => {
                if arg_types[0].kind != TypeKind::Integer {
                    self.report(SemanticError::ArgumentType {
                        function: builtin.name(),
                        message: format!(
                            "expects an integer argument ({} provided)",
                            arg_types[0]
                        ),
                    });
                    return None;
                }
                Some(SizedType::quantize())
            }
            Builtin::Count => Some(SizedType::count()),
            // delete() imposes no type constraint on the target map; the
            // assignment it sits in neither declares nor checks a type.
            Builtin::Delete => Some(SizedType::none()),
            Builtin::Str | Builtin::Sym | Builtin::Usym => {
                if arg_types[0].is_string_compatible() {
                    self.report(SemanticError::ArgumentType {
                        function: builtin.name(),
                        message: format!(
                            "expects a non-string argument ({} provided)",
                            arg_types[0]
                        ),
                    });
                    return None;
                }
                Some(match builtin {
                    Builtin::Str => SizedType::string(STRING_SIZE),
                    Builtin::Sym => SizedType::sym(),
                    _ => SizedType::usym(),
                })
            }
            Builtin::Reg => match &args[0].kind {
                ExprKind::Str(name) => {
                    if is_register(name) {
                        Some(SizedType::integer())
                    } else {
                        self.report(SemanticError::UnknownRegister(name.clone()));
                        None
                    }
                }
                _ => {
                    self.report(SemanticError::ArgumentType {
                        function: builtin.name(),
                        message: "expects a string-literal register name".to_string(),
                    });
                    None
                }
            },
            Builtin::Printf => {
                let ExprKind::Str(template) = &args[0].kind else {
                    self.report(SemanticError::ArgumentType {
                        function: builtin.name(),
                        message: "format string must be a string literal".to_string(),
                    });
                    return None;
                };
                if let Err(err) =
                    FormatValidator::validate_format_arguments(template, &arg_types[1..])
                {
                    self.report(SemanticError::Format(err));
                    return None;
                }
                Some(SizedType::none())
            }
        }
    }
}
