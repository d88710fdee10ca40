//! Type references used by record members and shape fields.
//!
//! A `TypeRef` names a type without owning its definition: record types are
//! referenced by name and resolved through a `Schema` when their structure is
//! needed. This keeps mutually-referencing record types (a course owns videos,
//! a video points back at its course) free of ownership cycles.

use std::fmt;

use crate::value::Value;

/// Primitive member types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    Text,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "Bool",
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::Text => "Text",
        }
    }
}

/// Concrete collection flavours a record member may declare.
///
/// `Sequence` is the read-only abstraction every other kind collapses into
/// when a shape field is synthesized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
    Bag,
    Sequence,
}

impl CollectionKind {
    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::List => "List",
            CollectionKind::Set => "Set",
            CollectionKind::Bag => "Bag",
            CollectionKind::Sequence => "Seq",
        }
    }
}

/// Reference to a member or field type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Scalar(ScalarType),
    /// A record type, by its registered name.
    Record(String),
    Collection {
        kind: CollectionKind,
        element: Box<TypeRef>,
    },
}

impl TypeRef {
    pub fn bool() -> Self {
        TypeRef::Scalar(ScalarType::Bool)
    }

    pub fn int() -> Self {
        TypeRef::Scalar(ScalarType::Int)
    }

    pub fn float() -> Self {
        TypeRef::Scalar(ScalarType::Float)
    }

    pub fn text() -> Self {
        TypeRef::Scalar(ScalarType::Text)
    }

    pub fn record(name: impl Into<String>) -> Self {
        TypeRef::Record(name.into())
    }

    pub fn collection(kind: CollectionKind, element: TypeRef) -> Self {
        TypeRef::Collection {
            kind,
            element: Box::new(element),
        }
    }

    pub fn list(element: TypeRef) -> Self {
        Self::collection(CollectionKind::List, element)
    }

    pub fn set(element: TypeRef) -> Self {
        Self::collection(CollectionKind::Set, element)
    }

    pub fn seq(element: TypeRef) -> Self {
        Self::collection(CollectionKind::Sequence, element)
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, TypeRef::Collection { .. })
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeRef::Scalar(_))
    }

    /// Element type of a collection, `None` for everything else.
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Collection { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Name of the record type this reference points at, directly.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            TypeRef::Record(name) => Some(name),
            _ => None,
        }
    }

    /// Collapse any collection kind into `Sequence`.
    ///
    /// Only the outermost level is rewritten; the element type is kept as
    /// declared. Idempotent.
    pub fn normalize(&self) -> TypeRef {
        match self {
            TypeRef::Collection { element, .. } => TypeRef::Collection {
                kind: CollectionKind::Sequence,
                element: element.clone(),
            },
            other => other.clone(),
        }
    }

    /// Component contributed to a shape key.
    ///
    /// Collections are marked with a `coll` prefix on their element's name,
    /// so `List<Video>` and `Set<Video>` both yield `collVideo`.
    pub fn key_name(&self) -> String {
        match self {
            TypeRef::Scalar(scalar) => scalar.name().to_owned(),
            TypeRef::Record(name) => name.clone(),
            TypeRef::Collection { element, .. } => format!("coll{}", element.key_name()),
        }
    }

    /// Whether `value` may be stored in a slot of this type.
    ///
    /// `Null` is accepted by reference-like types (text, records, collections)
    /// but not by `Bool`, `Int` or `Float`.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (
                TypeRef::Scalar(ScalarType::Text) | TypeRef::Record(_) | TypeRef::Collection { .. },
                Value::Null,
            ) => true,
            (TypeRef::Scalar(ScalarType::Bool), Value::Bool(_)) => true,
            (TypeRef::Scalar(ScalarType::Int), Value::Int(_)) => true,
            (TypeRef::Scalar(ScalarType::Float), Value::Float(_) | Value::Int(_)) => true,
            (TypeRef::Scalar(ScalarType::Text), Value::Text(_)) => true,
            (TypeRef::Record(name), Value::Record(record)) => record.type_name() == name,
            (TypeRef::Collection { element, .. }, Value::Collection(items)) => {
                items.iter().all(|item| element.accepts(item))
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(scalar) => f.write_str(scalar.name()),
            TypeRef::Record(name) => f.write_str(name),
            TypeRef::Collection { kind, element } => write!(f, "{}<{}>", kind.name(), element),
        }
    }
}
