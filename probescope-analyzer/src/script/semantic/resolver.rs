//! Expression type resolution
//!
//! Recursively assigns a [`SizedType`] to every expression node, consulting
//! the struct registry for casts and field accesses and the scope manager
//! for map/variable reads. A node that fails to resolve reports exactly one
//! diagnostic and poisons its ancestors (they resolve to `None` without
//! reporting anything further).

use super::calls::CallPosition;
use super::diagnostics::SemanticError;
use super::scope::StorageClass;
use super::SemanticAnalyzer;
use crate::script::ast::{Expr, ExprKind};
use probescope_types::{SizedType, TypeKind, STRING_SIZE};

impl SemanticAnalyzer<'_> {
    /// Resolve an expression's type, memoizing the result on the node.
    pub(crate) fn resolve_expr(&mut self, expr: &mut Expr) -> Option<SizedType> {
        if let Some(ty) = &expr.ty {
            return Some(ty.clone());
        }
        if matches!(expr.kind, ExprKind::Call { .. }) {
            return self.resolve_call(expr, CallPosition::Expression);
        }
        let ty = self.resolve_expr_kind(&mut expr.kind)?;
        if !self.quiet {
            expr.ty = Some(ty.clone());
        }
        Some(ty)
    }

    fn resolve_expr_kind(&mut self, kind: &mut ExprKind) -> Option<SizedType> {
        match kind {
            ExprKind::Int(_) => Some(SizedType::integer()),
            ExprKind::Str(_) => Some(SizedType::string(STRING_SIZE)),
            ExprKind::Identifier(name) => self.resolve_identifier(name),
            ExprKind::Map(name) => match self.scope.lookup(name, StorageClass::Map) {
                Some(ty) => Some(ty.clone()),
                None => {
                    let decorated = StorageClass::Map.decorate(name);
                    self.report(SemanticError::UndefinedMap(decorated));
                    None
                }
            },
            ExprKind::Variable(name) => match self.scope.lookup(name, StorageClass::Variable) {
                Some(ty) => Some(ty.clone()),
                None => {
                    let decorated = StorageClass::Variable.decorate(name);
                    self.report(SemanticError::UseBeforeAssign(decorated));
                    None
                }
            },
            ExprKind::Cast {
                type_name,
                pointer,
                operand,
            } => {
                self.resolve_expr(operand)?;
                let Some(size) = self.registry.get(type_name).map(|def| def.size) else {
                    self.report(SemanticError::UnknownType(type_name.clone()));
                    return None;
                };
                if *pointer {
                    Some(SizedType::struct_ptr(type_name.clone()))
                } else {
                    Some(SizedType::struct_type(type_name.clone(), size))
                }
            }
            ExprKind::Field { target, field } => {
                let receiver = self.resolve_expr(target)?;
                match &receiver.kind {
                    TypeKind::Struct(name) => {
                        let name = name.clone();
                        self.resolve_field(&name, field)
                    }
                    TypeKind::StructPtr(_) => {
                        self.report(SemanticError::WrongFieldAccessOperator {
                            field: field.clone(),
                            receiver,
                            hint: "; use '->' for pointer access",
                        });
                        None
                    }
                    _ => {
                        self.report(SemanticError::WrongFieldAccessOperator {
                            field: field.clone(),
                            receiver,
                            hint: "",
                        });
                        None
                    }
                }
            }
            ExprKind::PtrField { target, field } => {
                let receiver = self.resolve_expr(target)?;
                match &receiver.kind {
                    TypeKind::StructPtr(name) => {
                        let name = name.clone();
                        self.resolve_field(&name, field)
                    }
                    TypeKind::Struct(_) => {
                        self.report(SemanticError::WrongFieldAccessOperator {
                            field: field.clone(),
                            receiver,
                            hint: "; use '.' for non-pointer access",
                        });
                        None
                    }
                    _ => {
                        self.report(SemanticError::WrongFieldAccessOperator {
                            field: field.clone(),
                            receiver,
                            hint: "",
                        });
                        None
                    }
                }
            }
            ExprKind::Deref(target) => {
                let receiver = self.resolve_expr(target)?;
                match &receiver.kind {
                    TypeKind::StructPtr(name) => {
                        let name = name.clone();
                        let Some(size) = self.registry.get(&name).map(|def| def.size) else {
                            self.report(SemanticError::UnknownType(name));
                            return None;
                        };
                        Some(SizedType::struct_type(name, size))
                    }
                    _ => {
                        self.report(SemanticError::InvalidDereference(receiver));
                        None
                    }
                }
            }
            ExprKind::Binary { op, left, right } => {
                // Resolve both sides even when one fails, so independent
                // defects in each operand all surface.
                let lhs = self.resolve_expr(left);
                let rhs = self.resolve_expr(right);
                let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                    return None;
                };
                if !lhs.kind_matches(&rhs) {
                    self.report(SemanticError::BinaryTypeMismatch {
                        op: op.symbol(),
                        left: lhs,
                        right: rhs,
                    });
                    return None;
                }
                Some(SizedType::integer())
            }
            ExprKind::Call { .. } => unreachable!("calls are resolved via resolve_call"),
        }
    }

    /// Look up a field on a registered struct; the cast that produced the
    /// receiver type already verified the struct exists.
    fn resolve_field(&mut self, struct_name: &str, field: &str) -> Option<SizedType> {
        let Some(def) = self.registry.get(struct_name) else {
            self.report(SemanticError::UnknownType(struct_name.to_string()));
            return None;
        };
        match def.field(field) {
            Some(found) => Some(found.ty.clone()),
            None => {
                self.report(SemanticError::FieldNotFound {
                    struct_name: struct_name.to_string(),
                    field: field.to_string(),
                });
                None
            }
        }
    }

    /// The builtin context-variable table. Anything else is unknown.
    fn resolve_identifier(&mut self, name: &str) -> Option<SizedType> {
        let ty = match name {
            "pid" | "tid" | "uid" | "gid" | "nsecs" | "cpu" | "retval" => SizedType::integer(),
            "comm" => SizedType::string(STRING_SIZE),
            "stack" => SizedType::stack(),
            "ustack" => SizedType::ustack(),
            "func" => SizedType::sym(),
            _ if is_positional_arg(name) => SizedType::integer(),
            _ => {
                self.report(SemanticError::UnknownIdentifier(name.to_string()));
                return None;
            }
        };
        Some(ty)
    }
}

/// `arg0` through `arg9`.
fn is_positional_arg(name: &str) -> bool {
    name.strip_prefix("arg")
        .is_some_and(|rest| rest.len() == 1 && rest.chars().all(|c| c.is_ascii_digit()))
}
