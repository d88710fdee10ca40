#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for relshape.
//!
//! Three layers:
//! - **Schema layer**: record types and the type references their members use
//! - **Runtime layer**: values and records flowing through a query
//! - **Shape layer**: synthesized record shapes and their instances
//!
//! Nothing here synthesizes or caches shapes; that lives in `relshape-compiler`.

mod ordering;
mod schema;
mod shape;
mod types;
mod value;

#[cfg(test)]
mod ordering_tests;

pub use ordering::{
    DEFAULT_IDENTITY_KEY, DEFAULT_ORDER_KEY, OrderingCapability, OrderingContract,
};
pub use schema::{RecordType, RecordTypeBuilder, Schema, SchemaError};
pub use shape::{
    FieldSpec, MODEL_FIELD, Shape, ShapeError, ShapeField, ShapeId, ShapeKey, ShapeRecord,
};
pub use types::{CollectionKind, ScalarType, TypeRef};
pub use value::{Record, RecordBuilder, Value};
