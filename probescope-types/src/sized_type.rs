//! Value-type representation for the tracing language
//!
//! Every expression the analyzer accepts resolves to a [`SizedType`]: a
//! kind plus a byte size, with the struct name carried inside the cast
//! kinds. The representation is deliberately flat so it can be attached to
//! AST nodes and shipped across process boundaries unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte size of string values (literals, `comm`, `str()` results).
pub const STRING_SIZE: u64 = 64;

/// Byte size of pointers and word-sized scalars.
pub const POINTER_SIZE: u64 = 8;

/// Value kind - what sort of thing an expression evaluates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    /// Not yet resolved, or a value-less call such as `printf`.
    None,
    Integer,
    String,
    /// A value laid out as the named struct from the registry.
    Struct(String),
    /// A pointer to the named struct from the registry.
    StructPtr(String),
    /// Kernel symbol address (`sym()`, `func`).
    Sym,
    /// User-space symbol address (`usym()`).
    Usym,
    /// Result of the `count()` aggregation.
    Count,
    /// Result of the `quantize()` aggregation.
    Quantize,
    /// Kernel stack capture (`stack`).
    Stack,
    /// User stack capture (`ustack`).
    Ustack,
}

/// Resolved type of an expression: kind plus byte size.
///
/// Two `SizedType`s are equal iff kind, size, and struct name (when the
/// kind carries one) all match - this is the equality the scope rules use.
/// Binary operators and the format verifier compare kinds only, via
/// [`SizedType::kind_matches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedType {
    pub kind: TypeKind,
    pub size: u64,
}

impl SizedType {
    pub fn new(kind: TypeKind, size: u64) -> Self {
        Self { kind, size }
    }

    pub fn none() -> Self {
        Self::new(TypeKind::None, 0)
    }

    pub fn integer() -> Self {
        Self::new(TypeKind::Integer, 8)
    }

    pub fn string(size: u64) -> Self {
        Self::new(TypeKind::String, size)
    }

    /// A value laid out as the named struct; `size` is the struct's total
    /// size as recorded in the registry.
    pub fn struct_type(name: impl Into<String>, size: u64) -> Self {
        Self::new(TypeKind::Struct(name.into()), size)
    }

    /// A pointer to the named struct.
    pub fn struct_ptr(name: impl Into<String>) -> Self {
        Self::new(TypeKind::StructPtr(name.into()), POINTER_SIZE)
    }

    pub fn sym() -> Self {
        Self::new(TypeKind::Sym, 8)
    }

    pub fn usym() -> Self {
        Self::new(TypeKind::Usym, 8)
    }

    pub fn count() -> Self {
        Self::new(TypeKind::Count, 8)
    }

    pub fn quantize() -> Self {
        Self::new(TypeKind::Quantize, 8)
    }

    pub fn stack() -> Self {
        Self::new(TypeKind::Stack, 8)
    }

    pub fn ustack() -> Self {
        Self::new(TypeKind::Ustack, 8)
    }

    pub fn is_none(&self) -> bool {
        self.kind == TypeKind::None
    }

    /// The struct name when this is a cast or pointer-to-cast type.
    pub fn struct_name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Struct(name) | TypeKind::StructPtr(name) => Some(name),
            _ => None,
        }
    }

    /// Kind-only comparison, ignoring sizes and struct names. Binary
    /// operators use this: an 8-byte registry string field compares fine
    /// against a 64-byte string literal.
    pub fn kind_matches(&self, other: &SizedType) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
    }

    /// Whether a value of this type can satisfy a `%s` conversion. Symbol
    /// kinds count as strings at the format boundary only.
    pub fn is_string_compatible(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::String | TypeKind::Sym | TypeKind::Usym
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::None => write!(f, "none"),
            TypeKind::Integer => write!(f, "integer"),
            TypeKind::String => write!(f, "string"),
            TypeKind::Struct(name) => write!(f, "struct {name}"),
            TypeKind::StructPtr(name) => write!(f, "struct {name}*"),
            TypeKind::Sym => write!(f, "sym"),
            TypeKind::Usym => write!(f, "usym"),
            TypeKind::Count => write!(f, "count"),
            TypeKind::Quantize => write!(f, "quantize"),
            TypeKind::Stack => write!(f, "stack"),
            TypeKind::Ustack => write!(f, "ustack"),
        }
    }
}

impl fmt::Display for SizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_covers_kind_size_and_name() {
        assert_eq!(SizedType::integer(), SizedType::integer());
        assert_ne!(SizedType::integer(), SizedType::string(STRING_SIZE));
        assert_ne!(SizedType::string(8), SizedType::string(STRING_SIZE));
        assert_eq!(
            SizedType::struct_type("task", 16),
            SizedType::struct_type("task", 16)
        );
        assert_ne!(
            SizedType::struct_type("task", 16),
            SizedType::struct_type("file", 16)
        );
        assert_ne!(
            SizedType::struct_type("task", 16),
            SizedType::struct_ptr("task")
        );
    }

    #[test]
    fn kind_matches_ignores_size() {
        assert!(SizedType::string(8).kind_matches(&SizedType::string(STRING_SIZE)));
        assert!(!SizedType::string(8).kind_matches(&SizedType::integer()));
        assert!(SizedType::struct_type("a", 8).kind_matches(&SizedType::struct_type("b", 16)));
    }

    #[test]
    fn string_compatibility_includes_symbols() {
        assert!(SizedType::string(STRING_SIZE).is_string_compatible());
        assert!(SizedType::sym().is_string_compatible());
        assert!(SizedType::usym().is_string_compatible());
        assert!(!SizedType::integer().is_string_compatible());
        assert!(!SizedType::stack().is_string_compatible());
    }
}
