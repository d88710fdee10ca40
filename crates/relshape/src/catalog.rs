use std::sync::Arc;

use relshape_compiler::{CompilerConfig, ProjectionCompiler, Selector, ShapeCache};
use relshape_core::{OrderingContract, Record, Schema};
use relshape_ir::Query;
use relshape_vm::{Engine, ExecLimits, Row};

use crate::Result;

/// A schema together with its shape cache, compiler and engine settings.
///
/// Cloning is cheap and clones share the shape cache.
#[derive(Clone, Debug)]
pub struct Catalog {
    compiler: ProjectionCompiler,
    limits: ExecLimits,
}

impl Catalog {
    pub fn new(schema: Schema) -> Self {
        Self::with_contract(schema, OrderingContract::default())
    }

    /// Use non-default order and identity key names.
    pub fn with_contract(schema: Schema, contract: OrderingContract) -> Self {
        let cache = ShapeCache::with_contract(Arc::new(schema), contract);
        Self {
            compiler: ProjectionCompiler::new(Arc::new(cache)),
            limits: ExecLimits::default(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.compiler = self.compiler.with_config(config);
        self
    }

    pub fn with_limits(mut self, limits: ExecLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn schema(&self) -> &Schema {
        self.compiler.cache().schema()
    }

    pub fn cache(&self) -> &Arc<ShapeCache> {
        self.compiler.cache()
    }

    pub fn compiler(&self) -> &ProjectionCompiler {
        &self.compiler
    }

    pub fn engine(&self) -> Engine<'_> {
        Engine::new(self.schema()).with_limits(self.limits)
    }

    pub fn project(&self, query: &Query, selectors: &[Selector]) -> Result<Query> {
        Ok(self.compiler.build_projection(query, selectors)?)
    }

    pub fn project_members(&self, query: &Query, members: &[&str]) -> Result<Query> {
        Ok(self.compiler.build_projection_for_members(query, members)?)
    }

    pub fn execute<I>(&self, query: &Query, rows: I) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = Arc<Record>>,
    {
        Ok(self.engine().run(query, rows)?)
    }
}
