//! Field-type inference for generated syntax-tree nodes.
//!
//! Consumes the capture structure of a rule body and decides, per mapping
//! parameter, what container and element type the generated node field
//! gets. Anything ambiguous degrades to [`FieldType::Opaque`] rather than
//! guessing.

mod infer;


pub use infer::{infer_field_type, rule_field_types, type_map, FieldType, TypeRef};
