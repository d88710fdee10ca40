//! Reference engine for relshape queries.
//!
//! Translates a deferred `Query` into a pipeline of operators and runs it over
//! in-memory records, materializing shape instances at projection stages.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;

pub use engine::{Engine, ExecLimits, Plan, Row, RuntimeError};
