//! Ordering capabilities of record types.
//!
//! A record type can be auto-sorted when it carries an explicit position
//! member or, failing that, an integer identity member. Capabilities are
//! discovered by name and type only; nothing has to be declared up front.

use crate::schema::{RecordType, Schema};
use crate::types::TypeRef;

/// Default name of the explicit position member.
pub const DEFAULT_ORDER_KEY: &str = "OrderIndex";
/// Default name of the identity member.
pub const DEFAULT_IDENTITY_KEY: &str = "Id";

/// How a record type may be ordered inside a projected sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrderingCapability {
    /// Explicit position member; always preferred.
    OrderKey(String),
    /// Integer identity member; used when no position member exists.
    IdentityKey(String),
    Unordered,
}

impl OrderingCapability {
    /// Member to sort by, if any.
    pub fn sort_key(&self) -> Option<&str> {
        match self {
            OrderingCapability::OrderKey(key) | OrderingCapability::IdentityKey(key) => Some(key),
            OrderingCapability::Unordered => None,
        }
    }

    pub fn is_ordered(&self) -> bool {
        !matches!(self, OrderingCapability::Unordered)
    }
}

/// Member names that satisfy each ordering capability.
///
/// Both members must be `Int`-typed to count.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderingContract {
    pub(crate) order_key: String,
    pub(crate) identity_key: String,
}

impl Default for OrderingContract {
    fn default() -> Self {
        Self {
            order_key: DEFAULT_ORDER_KEY.to_owned(),
            identity_key: DEFAULT_IDENTITY_KEY.to_owned(),
        }
    }
}

impl OrderingContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explicit position member name.
    pub fn order_key(mut self, name: impl Into<String>) -> Self {
        self.order_key = name.into();
        self
    }

    /// Set the identity member name.
    pub fn identity_key(mut self, name: impl Into<String>) -> Self {
        self.identity_key = name.into();
        self
    }

    pub fn get_order_key(&self) -> &str {
        &self.order_key
    }

    pub fn get_identity_key(&self) -> &str {
        &self.identity_key
    }

    /// Capability of a record type.
    pub fn detect(&self, record: &RecordType) -> OrderingCapability {
        let is_int = |name: &str| record.member(name) == Some(&TypeRef::int());

        if is_int(&self.order_key) {
            OrderingCapability::OrderKey(self.order_key.clone())
        } else if is_int(&self.identity_key) {
            OrderingCapability::IdentityKey(self.identity_key.clone())
        } else {
            OrderingCapability::Unordered
        }
    }

    /// Capability of the elements of a field type.
    ///
    /// Non-collections, scalar elements and element record types missing from
    /// `schema` are all `Unordered`.
    pub fn detect_elements(&self, schema: &Schema, ty: &TypeRef) -> OrderingCapability {
        ty.element()
            .and_then(TypeRef::record_name)
            .and_then(|name| schema.get(name))
            .map_or(OrderingCapability::Unordered, |record| self.detect(record))
    }
}
