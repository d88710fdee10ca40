//! Shape synthesis with a structural cache.
//!
//! Shapes are interned by `ShapeKey`: the first request for a key builds the
//! shape, every later request with the same key gets the same `Arc<Shape>`.
//! Entries are never evicted; the set of distinct keys is bounded by the
//! application's own projection call sites.
//!
//! # Locking
//!
//! Hits take a shared read lock only. A miss takes the write lock and checks
//! again before building, so concurrent first requests for one key build
//! exactly one shape.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use relshape_core::{
    FieldSpec, MODEL_FIELD, OrderingContract, RecordType, Schema, Shape, ShapeField, ShapeId,
    ShapeKey,
};
use tracing::{debug, trace};

use crate::error::SynthError;

/// Counters exposed for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Shapes built.
    pub synthesized: usize,
    /// Requests answered from the cache.
    pub hits: usize,
}

/// Process-lifetime cache of synthesized shapes for one schema.
///
/// Share it behind an `Arc` between every compiler that should agree on
/// shape identity. All methods take `&self` and are safe to call from many
/// threads.
#[derive(Debug)]
pub struct ShapeCache {
    schema: Arc<Schema>,
    contract: OrderingContract,
    shapes: RwLock<HashMap<ShapeKey, Arc<Shape>>>,
    synthesized: AtomicUsize,
    hits: AtomicUsize,
}

impl ShapeCache {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_contract(schema, OrderingContract::default())
    }

    pub fn with_contract(schema: Arc<Schema>, contract: OrderingContract) -> Self {
        Self {
            schema,
            contract,
            shapes: RwLock::new(HashMap::new()),
            synthesized: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn contract(&self) -> &OrderingContract {
        &self.contract
    }

    /// Shape for `spec` hanging off record type `base`, built on first use.
    ///
    /// Collection field types are normalized to sequences before the key is
    /// computed, so specs differing only in collection kind or entry order
    /// share one shape.
    pub fn get_or_create_shape(
        &self,
        spec: &FieldSpec,
        base: &str,
    ) -> Result<Arc<Shape>, SynthError> {
        if spec.is_empty() {
            return Err(SynthError::EmptySpec);
        }
        if spec.contains(MODEL_FIELD) {
            return Err(SynthError::ReservedFieldName);
        }
        let base = self
            .schema
            .get(base)
            .ok_or_else(|| SynthError::UnknownRecordType(base.to_owned()))?;

        let spec = spec.normalized();
        let key = ShapeKey::compute(base.name(), &spec);

        if let Some(shape) = self.shapes.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "shape cache hit");
            return Ok(Arc::clone(shape));
        }

        let mut shapes = self.shapes.write();
        // Another thread may have built it between our read and write lock.
        if let Some(shape) = shapes.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "shape cache hit after lock upgrade");
            return Ok(Arc::clone(shape));
        }

        let id = u32::try_from(shapes.len())
            .map(ShapeId)
            .map_err(|_| SynthError::CacheFull)?;
        let shape = Arc::new(self.synthesize(id, key.clone(), base, &spec));
        shapes.insert(key, Arc::clone(&shape));
        self.synthesized.fetch_add(1, Ordering::Relaxed);

        debug!(
            key = %shape.key(),
            id = id.0,
            fields = shape.fields().len(),
            "synthesized shape"
        );
        Ok(shape)
    }

    fn synthesize(
        &self,
        id: ShapeId,
        key: ShapeKey,
        base: &RecordType,
        spec: &FieldSpec,
    ) -> Shape {
        let fields = spec
            .iter()
            .map(|(name, ty)| {
                let ordering = self.contract.detect_elements(&self.schema, ty);
                ShapeField::new(name, ty.clone(), ordering)
            })
            .collect();
        Shape::new(id, key, base.name(), fields)
    }

    /// Previously synthesized shape, without building.
    pub fn get(&self, key: &ShapeKey) -> Option<Arc<Shape>> {
        self.shapes.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.shapes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            synthesized: self.synthesized.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}
