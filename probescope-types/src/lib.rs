//! Probescope Types Library
//!
//! Provides the value-type representation and the struct registry shared
//! between the probescope front end and its surrounding collaborators
//! (debug-info importers, lowering backends).

mod registry;
mod sized_type;

pub use registry::{FieldDef, StructDef, TypeRegistry};
pub use sized_type::{SizedType, TypeKind, POINTER_SIZE, STRING_SIZE};
