//! Query execution.
//!
//! `Engine::translate` checks a query against the schema and lowers it into a
//! `Plan`. `Plan::execute` wires the plan into boxed operators (scan, filter,
//! sort, project) and drains them.

mod error;
mod eval;
mod exec;
mod operator;
mod plan;
mod row;

#[cfg(test)]
mod engine_tests;

pub use error::RuntimeError;
pub use exec::{Engine, ExecLimits};
pub use plan::Plan;
pub use row::Row;
