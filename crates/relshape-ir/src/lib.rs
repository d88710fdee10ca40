//! Inspectable intermediate form for relshape queries.
//!
//! This crate contains:
//! - The deferred `Query`: a source record type plus ordered stages
//! - Stage payloads: predicates, sort keys and projections
//! - A human-readable dump for debugging and snapshot tests
//!
//! Nothing here evaluates a query. Engines walk the stages and translate
//! them into their own execution plan.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod dump;
mod predicate;
mod projection;
mod query;


pub use dump::dump;
pub use predicate::Predicate;
pub use projection::{Binding, BindingSource, OrderBy, OrderOrigin, Projection};
pub use query::{Direction, ElementType, Query, SortKey, Stage};
