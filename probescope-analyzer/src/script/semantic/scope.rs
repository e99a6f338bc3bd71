//! Scope management for the two storage classes
//!
//! Maps (`@name`) live in one process-wide namespace shared by every
//! probe; variables (`$name`) live in a per-probe namespace that is reset
//! before each probe's block is analyzed. Both follow the same rule: a
//! name's type is fixed by its first assignment, and every later
//! assignment must produce the identical type.

use super::diagnostics::SemanticError;
use probescope_types::SizedType;
use std::collections::HashMap;
use tracing::debug;

/// Which namespace a name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    /// `@name` - global across all probes.
    Map,
    /// `$name` - local to the enclosing probe.
    Variable,
}

impl StorageClass {
    /// Sigil-decorated name for diagnostics.
    pub fn decorate(&self, name: &str) -> String {
        match self {
            StorageClass::Map => format!("@{name}"),
            StorageClass::Variable => format!("${name}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopeManager {
    maps: HashMap<String, SizedType>,
    locals: HashMap<String, SizedType>,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the local variable namespace; called before each probe's
    /// block is analyzed.
    pub fn enter_probe(&mut self) {
        debug!("clearing {} probe-local variable(s)", self.locals.len());
        self.locals.clear();
    }

    /// Record `ty` for `name` on first occurrence; on later occurrences
    /// succeed iff the type is identical.
    pub fn declare_or_check(
        &mut self,
        name: &str,
        storage: StorageClass,
        ty: SizedType,
    ) -> Result<(), SemanticError> {
        let table = match storage {
            StorageClass::Map => &mut self.maps,
            StorageClass::Variable => &mut self.locals,
        };
        match table.get(name) {
            None => {
                debug!("declaring {} with type {}", storage.decorate(name), ty);
                table.insert(name.to_string(), ty);
                Ok(())
            }
            Some(existing) if *existing == ty => Ok(()),
            Some(existing) => Err(SemanticError::ReassignmentTypeMismatch {
                name: storage.decorate(name),
                existing: existing.clone(),
                new: ty,
            }),
        }
    }

    pub fn lookup(&self, name: &str, storage: StorageClass) -> Option<&SizedType> {
        match storage {
            StorageClass::Map => self.maps.get(name),
            StorageClass::Variable => self.locals.get(name),
        }
    }

    /// Number of maps with a recorded type; the collection prepass uses
    /// this as its fixpoint measure.
    pub fn map_count(&self) -> usize {
        self.maps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probescope_types::STRING_SIZE;

    #[test]
    fn first_assignment_fixes_the_type() {
        let mut scope = ScopeManager::new();
        scope
            .declare_or_check("x", StorageClass::Map, SizedType::integer())
            .unwrap();
        scope
            .declare_or_check("x", StorageClass::Map, SizedType::integer())
            .unwrap();

        let err = scope
            .declare_or_check("x", StorageClass::Map, SizedType::string(STRING_SIZE))
            .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ReassignmentTypeMismatch { ref name, .. } if name == "@x"
        ));
    }

    #[test]
    fn namespaces_are_independent() {
        let mut scope = ScopeManager::new();
        scope
            .declare_or_check("x", StorageClass::Map, SizedType::integer())
            .unwrap();
        // Same bare name, different storage class, different type: fine.
        scope
            .declare_or_check("x", StorageClass::Variable, SizedType::string(STRING_SIZE))
            .unwrap();
        assert_eq!(
            scope.lookup("x", StorageClass::Map),
            Some(&SizedType::integer())
        );
    }

    #[test]
    fn enter_probe_clears_locals_only() {
        let mut scope = ScopeManager::new();
        scope
            .declare_or_check("m", StorageClass::Map, SizedType::integer())
            .unwrap();
        scope
            .declare_or_check("v", StorageClass::Variable, SizedType::integer())
            .unwrap();

        scope.enter_probe();
        assert!(scope.lookup("v", StorageClass::Variable).is_none());
        assert!(scope.lookup("m", StorageClass::Map).is_some());

        // A fresh probe may rebind the same variable name to a new type.
        scope
            .declare_or_check("v", StorageClass::Variable, SizedType::string(STRING_SIZE))
            .unwrap();
    }
}
