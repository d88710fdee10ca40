//! relshape compiler: shape synthesis and projection compilation.
//!
//! - `synth` - the shape cache that manufactures one `Shape` per distinct
//!   field combination
//! - `selector` - inspectable relationship selectors (`m => m.Videos`)
//! - `project` - lowering selectors into a projection stage on a deferred query
//! - `config` - compiler options

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
mod error;
pub mod project;
pub mod selector;
pub mod synth;

#[cfg(test)]
pub mod test_utils;

pub use config::CompilerConfig;
pub use error::{CompileError, ErrorKind, SynthError};
pub use project::ProjectionCompiler;
pub use selector::{Expr, OrderingOverride, Selector};
pub use synth::{CacheStats, ShapeCache};

/// Result type for projection compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
