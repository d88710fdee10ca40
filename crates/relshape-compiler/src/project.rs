//! Projection compilation.
//!
//! Turns a list of relationship selectors into a `Stage::Project` appended to
//! a deferred query. The stage is pure description: each shape field gets a
//! binding naming the member it reads and, for sequences whose element type
//! has an ordering capability, the key to sort by. Nothing is evaluated here.

use std::collections::HashMap;
use std::sync::Arc;

use relshape_core::{FieldSpec, OrderingCapability, SchemaError, Shape, ShapeField};
use relshape_ir::{Binding, OrderBy, OrderOrigin, Projection, Query};
use tracing::debug;

use crate::Result;
use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::selector::{OrderingOverride, Selector};
use crate::synth::ShapeCache;

/// Compiles relationship selectors into projection stages.
///
/// Holds no per-call state; shape identity is delegated to the shared cache.
#[derive(Debug, Clone)]
pub struct ProjectionCompiler {
    cache: Arc<ShapeCache>,
    config: CompilerConfig,
}

impl ProjectionCompiler {
    pub fn new(cache: Arc<ShapeCache>) -> Self {
        Self {
            cache,
            config: CompilerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &Arc<ShapeCache> {
        &self.cache
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Project `query` onto a shape made of the selected relationships.
    ///
    /// Returns a new query; `query` itself is left untouched. Repeated
    /// selectors for one member collapse into one field, the last one's
    /// ordering override winning.
    pub fn build_projection(&self, query: &Query, selectors: &[Selector]) -> Result<Query> {
        if query.is_projected() {
            return Err(CompileError::AlreadyProjected(query.source().to_owned()));
        }

        let schema = self.cache.schema();
        let base = schema.resolve(query.source())?;

        let mut spec = FieldSpec::new();
        let mut overrides: HashMap<&str, &OrderingOverride> = HashMap::new();
        for selector in selectors {
            let name = selector
                .resolve_member()
                .ok_or_else(|| CompileError::InvalidSelector {
                    record: base.name().to_owned(),
                    selector: selector.to_string(),
                })?;
            let ty = base
                .member(name)
                .ok_or_else(|| SchemaError::UnknownMember {
                    record: base.name().to_owned(),
                    member: name.to_owned(),
                })?;
            spec.insert(name, ty.clone());
            overrides.insert(name, selector.ordering());
        }

        let shape = self.cache.get_or_create_shape(&spec, base.name())?;
        let bindings = self.bind(&shape, &overrides)?;

        debug!(
            source = query.source(),
            shape = %shape.key(),
            bindings = bindings.len(),
            "compiled projection"
        );
        Ok(query.clone().project(Projection::new(shape, bindings)))
    }

    /// Same as [`build_projection`](Self::build_projection), selecting members by name.
    pub fn build_projection_for_members(&self, query: &Query, members: &[&str]) -> Result<Query> {
        let selectors: Vec<Selector> = members.iter().map(|&m| Selector::member(m)).collect();
        self.build_projection(query, &selectors)
    }

    fn bind(
        &self,
        shape: &Shape,
        overrides: &HashMap<&str, &OrderingOverride>,
    ) -> Result<Vec<Binding>> {
        let mut bindings = Vec::with_capacity(shape.fields().len() + 1);

        for field in shape.fields() {
            let order = match overrides.get(field.name()).copied() {
                None | Some(OrderingOverride::Auto) => self.capability_order(field),
                Some(OrderingOverride::Unordered) => None,
                Some(OrderingOverride::By { key, direction }) => {
                    self.check_override_key(field, key)?;
                    Some(OrderBy {
                        key: key.clone(),
                        direction: *direction,
                        origin: OrderOrigin::Override,
                    })
                }
            };
            bindings.push(Binding::member(field.name(), field.name()).with_order(order));
        }

        bindings.push(Binding::model());
        Ok(bindings)
    }

    fn capability_order(&self, field: &ShapeField) -> Option<OrderBy> {
        if !self.config.auto_order || !field.ty().is_collection() {
            return None;
        }
        let (key, origin) = match field.ordering() {
            OrderingCapability::OrderKey(key) => (key, OrderOrigin::OrderKey),
            OrderingCapability::IdentityKey(key) => (key, OrderOrigin::IdentityKey),
            OrderingCapability::Unordered => return None,
        };
        Some(OrderBy {
            key: key.clone(),
            direction: self.config.direction,
            origin,
        })
    }

    /// An explicit key must sort a sequence, and must exist on the element
    /// type when that type is known to the schema.
    fn check_override_key(&self, field: &ShapeField, key: &str) -> Result<()> {
        let Some(element) = field.ty().element() else {
            return Err(CompileError::NotASequence {
                field: field.name().to_owned(),
            });
        };
        let known = element
            .record_name()
            .and_then(|name| self.cache.schema().get(name));
        if let Some(record) = known
            && !record.has_member(key)
        {
            return Err(SchemaError::UnknownMember {
                record: record.name().to_owned(),
                member: key.to_owned(),
            }
            .into());
        }
        Ok(())
    }
}
