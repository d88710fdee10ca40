//! relshape: dynamic shape synthesis and projection compilation.
//!
//! Given a base record type and a set of relationship members on it, relshape
//! synthesizes (once per distinct combination) a shape exposing exactly those
//! members plus a `Model` back-reference, and appends an inspectable projection
//! stage to a deferred query. Sequence members are ordered by their element
//! type's `OrderIndex` member, falling back to `Id`.
//!
//! # Example
//!
//! ```
//! use relshape::{Catalog, Query, Record, RecordType, Schema, TypeRef, Value};
//!
//! let course = RecordType::builder("Course")
//!     .member("Id", TypeRef::int())
//!     .member("Videos", TypeRef::list(TypeRef::record("Video")))
//!     .build()
//!     .unwrap();
//! let video = RecordType::builder("Video")
//!     .member("Id", TypeRef::int())
//!     .member("OrderIndex", TypeRef::int())
//!     .build()
//!     .unwrap();
//! let schema = Schema::new().with(course).unwrap().with(video).unwrap();
//! let catalog = Catalog::new(schema);
//!
//! let query = catalog
//!     .project_members(&Query::over("Course"), &["Videos"])
//!     .unwrap();
//! eprintln!("{}", relshape::dump(&query));
//!
//! let videos: Vec<Value> = vec![
//!     Record::builder("Video").set("Id", 1).set("OrderIndex", 2).build().into(),
//!     Record::builder("Video").set("Id", 2).set("OrderIndex", 1).build().into(),
//! ];
//! let row = Record::builder("Course").set("Id", 1).set("Videos", videos).build();
//! let rows = catalog.execute(&query, [row]).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod catalog;


pub use catalog::Catalog;

pub use relshape_compiler::{
    CacheStats, CompileError, CompilerConfig, ErrorKind, Expr, OrderingOverride,
    ProjectionCompiler, Selector, ShapeCache, SynthError,
};
pub use relshape_core::{
    CollectionKind, DEFAULT_IDENTITY_KEY, DEFAULT_ORDER_KEY, FieldSpec, MODEL_FIELD,
    OrderingCapability, OrderingContract, Record, RecordBuilder, RecordType, ScalarType, Schema,
    SchemaError, Shape, ShapeError, ShapeField, ShapeId, ShapeKey, ShapeRecord, TypeRef, Value,
};
pub use relshape_ir::{
    Binding, BindingSource, Direction, ElementType, OrderBy, OrderOrigin, Predicate, Projection,
    Query, SortKey, Stage, dump,
};
pub use relshape_vm::{Engine, ExecLimits, Plan, Row, RuntimeError};

/// Errors from either compiling or executing a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;
