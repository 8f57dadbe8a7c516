//! Descriptor module
//!
//! Metadata resolution over registered models.
//!
//! # Overview
//!
//! - `Descriptor` - registry answering type, flag and relation queries
//! - `FieldAddress` - `prefix__field` addressing of sub-resource fields
//! - `build_fields` - framework field declarations derived from a model

mod address;
mod builder;
mod registry;

pub use address::{list_id, nested_id, split_list_id, FieldAddress, LIST_SEPARATOR, NESTED_SEPARATOR};
pub use builder::{build_fields, FieldSpec};
pub use registry::{Descriptor, DEFAULT_EXCLUDED};
