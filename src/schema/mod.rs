//! Schema module
//!
//! Declarative model tables and the dynamic records built from them.
//!
//! # Overview
//!
//! - `ModelDef` / `FieldDef` - per-model field table (native type, forced
//!   wire type, groups, relation, optional reader/writer closures)
//! - `Instance` / `FieldValue` - in-memory record of one remote resource
//! - `WireType` - semantic type exchanged with the sync framework

mod definition;
mod types;

pub use definition::{FieldDef, ModelDef, ReadFn, WriteFn};
pub use types::{FieldValue, Group, Instance, NativeType, View, WireType};

#[cfg(test)]
mod tests;
