//! Struct registry
//!
//! Named struct layouts supplied by an external source (typically a
//! debug-info importer) before analysis begins. Records are flat and
//! independently owned; a field whose type is another struct references it
//! by name only, so arbitrarily recursive struct graphs need no ownership
//! cycles - resolution happens lazily at lookup time.

use crate::sized_type::SizedType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One field of a registered struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: SizedType,
    /// Byte offset within the owning struct.
    pub offset: u64,
}

/// A registered struct layout: total size plus ordered fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructDef {
    pub size: u64,
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            fields: Vec::new(),
        }
    }

    /// Builder-style field append, for importers and test fixtures.
    pub fn with_field(mut self, name: impl Into<String>, ty: SizedType, offset: u64) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
            offset,
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Name-keyed collection of struct layouts. Read-only during analysis;
/// callers populate it fully before handing it to the analyzer and must
/// not mutate it while analysis is in progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeRegistry {
    structs: HashMap<String, StructDef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, def: StructDef) {
        self.structs.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_preserves_declared_types() {
        let mut registry = TypeRegistry::new();
        registry.insert(
            "task",
            StructDef::new(24)
                .with_field("pid", SizedType::integer(), 0)
                .with_field("comm", SizedType::string(16), 8),
        );

        let task = registry.get("task").unwrap();
        assert_eq!(task.size, 24);
        assert_eq!(task.field("pid").unwrap().ty, SizedType::integer());
        assert_eq!(task.field("comm").unwrap().offset, 8);
        assert!(task.field("nope").is_none());
    }

    #[test]
    fn struct_references_resolve_by_name() {
        // "outer" refers to "inner" by name; the registry holds both as
        // independent records, so mutual references cannot form ownership
        // cycles.
        let mut registry = TypeRegistry::new();
        registry.insert(
            "outer",
            StructDef::new(16)
                .with_field("inner", SizedType::struct_type("inner", 8), 0)
                .with_field("link", SizedType::struct_ptr("outer"), 8),
        );
        registry.insert(
            "inner",
            StructDef::new(8).with_field("value", SizedType::integer(), 0),
        );

        let outer = registry.get("outer").unwrap();
        let inner_name = outer.field("inner").unwrap().ty.struct_name().unwrap();
        assert_eq!(
            registry.get(inner_name).unwrap().field("value").unwrap().ty,
            SizedType::integer()
        );
    }
}
