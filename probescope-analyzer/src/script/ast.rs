//! AST contract for tracing-language programs
//!
//! The parser produces these nodes; the semantic pass consumes them and
//! fills in each expression's `ty` annotation. Lowering reads only nodes
//! whose annotation was successfully resolved.

use probescope_types::SizedType;
use std::fmt;

/// A complete program: an ordered list of probes.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub probes: Vec<Probe>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_probe(&mut self, probe: Probe) {
        self.probes.push(probe);
    }
}

/// An attachment point with an optional guard predicate and a statement
/// block that runs when the probe fires.
#[derive(Debug, Clone)]
pub struct Probe {
    pub attach_point: AttachPoint,
    pub predicate: Option<Expr>,
    pub statements: Vec<Statement>,
}

impl Probe {
    pub fn new(attach_point: AttachPoint) -> Self {
        Self {
            attach_point,
            predicate: None,
            statements: Vec::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: Expr) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }
}

/// The kinds of probe the language supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Kernel function entry.
    Kprobe,
    /// Kernel function return.
    Kretprobe,
    /// User function entry.
    Uprobe,
    /// User function return.
    Uretprobe,
    /// Static kernel tracepoint.
    Tracepoint,
    /// Lifecycle hook before any probe attaches.
    Begin,
    /// Lifecycle hook after all probes detach.
    End,
    /// Timer probe.
    Profile,
}

impl ProbeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::Kprobe => "kprobe",
            ProbeKind::Kretprobe => "kretprobe",
            ProbeKind::Uprobe => "uprobe",
            ProbeKind::Uretprobe => "uretprobe",
            ProbeKind::Tracepoint => "tracepoint",
            ProbeKind::Begin => "BEGIN",
            ProbeKind::End => "END",
            ProbeKind::Profile => "profile",
        }
    }
}

/// An attach-point specifier: the probe-type tag plus its colon-separated
/// parts (target path, function or event name, or timer unit and value).
/// Which parts are required is validated per probe kind, independently of
/// the statement block.
#[derive(Debug, Clone)]
pub struct AttachPoint {
    pub kind: ProbeKind,
    pub parts: Vec<String>,
}

impl AttachPoint {
    pub fn new(kind: ProbeKind) -> Self {
        Self {
            kind,
            parts: Vec::new(),
        }
    }

    /// Builder-style part append.
    pub fn part(mut self, part: impl Into<String>) -> Self {
        self.parts.push(part.into());
        self
    }
}

impl fmt::Display for AttachPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        for part in &self.parts {
            write!(f, ":{part}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    /// `@name = value`
    AssignMap { name: String, value: Expr },
    /// `$name = value`
    AssignVar { name: String, value: Expr },
    /// Bare expression statement.
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// An expression node plus its resolved-type annotation. `ty` is `None`
/// until semantic analysis assigns it; nodes whose resolution failed keep
/// `None` and carry a diagnostic instead.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Option<SizedType>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Str(String),
    /// Builtin context variable such as `pid` or `comm`.
    Identifier(String),
    /// Global aggregation map `@name`.
    Map(String),
    /// Probe-local scratch variable `$name`.
    Variable(String),
    /// `(Name)expr` or `(Name*)expr` - bind a value to a registered
    /// struct layout.
    Cast {
        type_name: String,
        pointer: bool,
        operand: Box<Expr>,
    },
    /// `expr.field` on a struct-typed receiver.
    Field { target: Box<Expr>, field: String },
    /// `expr->field` on a struct-pointer receiver.
    PtrField { target: Box<Expr>, field: String },
    /// `*expr` on a struct-pointer receiver.
    Deref(Box<Expr>),
    /// Builtin function call.
    Call { function: String, args: Vec<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Self { kind, ty: None }
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Str(value.into()))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Identifier(name.into()))
    }

    pub fn map(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Map(name.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Variable(name.into()))
    }

    pub fn cast(type_name: impl Into<String>, operand: Expr) -> Self {
        Self::new(ExprKind::Cast {
            type_name: type_name.into(),
            pointer: false,
            operand: Box::new(operand),
        })
    }

    pub fn cast_ptr(type_name: impl Into<String>, operand: Expr) -> Self {
        Self::new(ExprKind::Cast {
            type_name: type_name.into(),
            pointer: true,
            operand: Box::new(operand),
        })
    }

    pub fn field(target: Expr, field: impl Into<String>) -> Self {
        Self::new(ExprKind::Field {
            target: Box::new(target),
            field: field.into(),
        })
    }

    pub fn ptr_field(target: Expr, field: impl Into<String>) -> Self {
        Self::new(ExprKind::PtrField {
            target: Box::new(target),
            field: field.into(),
        })
    }

    pub fn deref(target: Expr) -> Self {
        Self::new(ExprKind::Deref(Box::new(target)))
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            function: function.into(),
            args,
        })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}
