//! Projection stage: how each field of a synthesized shape is filled.
//!
//! A projection is a list of field bindings, matched to shape fields by name.
//! Each binding names where the value comes from and, for sequence fields,
//! how the elements are ordered. Engines translate bindings; they never call
//! back into the compiler.

use std::sync::Arc;

use relshape_core::{MODEL_FIELD, Shape};

use crate::query::Direction;

/// Where a bound field reads from, relative to the source record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingSource {
    /// The source record itself.
    Record,
    /// A member of the source record.
    Member(String),
}

/// Why a binding carries an ordering instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderOrigin {
    /// Element type exposes an explicit position member.
    OrderKey,
    /// Element type only exposes an identity member.
    IdentityKey,
    /// The caller asked for this key.
    Override,
}

impl OrderOrigin {
    pub fn label(self) -> &'static str {
        match self {
            OrderOrigin::OrderKey => "order key",
            OrderOrigin::IdentityKey => "identity key",
            OrderOrigin::Override => "override",
        }
    }
}

/// Sort a sequence-valued binding by one element member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub key: String,
    pub direction: Direction,
    pub origin: OrderOrigin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub field: String,
    pub source: BindingSource,
    pub order: Option<OrderBy>,
}

impl Binding {
    /// The back-reference binding: `Model <- record`.
    pub fn model() -> Self {
        Self {
            field: MODEL_FIELD.to_owned(),
            source: BindingSource::Record,
            order: None,
        }
    }

    pub fn member(field: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            source: BindingSource::Member(member.into()),
            order: None,
        }
    }

    pub fn with_order(mut self, order: Option<OrderBy>) -> Self {
        self.order = order;
        self
    }

    pub fn is_model(&self) -> bool {
        self.source == BindingSource::Record
    }
}

/// Projection of source records onto a shape.
#[derive(Clone, Debug)]
pub struct Projection {
    shape: Arc<Shape>,
    bindings: Vec<Binding>,
}

impl Projection {
    pub fn new(shape: Arc<Shape>, bindings: Vec<Binding>) -> Self {
        Self { shape, bindings }
    }

    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding(&self, field: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.field == field)
    }
}

impl PartialEq for Projection {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shape, &other.shape) && self.bindings == other.bindings
    }
}
