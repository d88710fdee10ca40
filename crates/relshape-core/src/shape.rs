//! Synthesized record shapes.
//!
//! A shape is a record type manufactured at run time from a field
//! specification: one reserved `Model` field pointing back at the source
//! record, plus one field per specification entry. Shapes never change after
//! construction; callers share them as `Arc<Shape>` and compare them by pointer.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::ordering::OrderingCapability;
use crate::types::TypeRef;
use crate::value::{Record, Value};

/// Reserved name of the back-reference field.
pub const MODEL_FIELD: &str = "Model";

/// Errors raised when reading or writing shape instances.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("shape `{shape}` has no field `{field}`")]
    UnknownField { shape: String, field: String },

    #[error("field `{field}` expects {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("back-reference expects a `{expected}` record, found `{found}`")]
    ModelTypeMismatch { expected: String, found: String },
}

/// Requested fields of a shape: field name to field type.
///
/// Names are unique; inserting an existing name replaces its type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSpec {
    fields: IndexMap<String, TypeRef>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.insert(name, ty);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: TypeRef) -> Option<TypeRef> {
        self.fields.insert(name.into(), ty)
    }

    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeRef)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of this specification with every collection collapsed to a sequence.
    pub fn normalized(&self) -> FieldSpec {
        self.fields
            .iter()
            .map(|(name, ty)| (name.clone(), ty.normalize()))
            .collect()
    }
}

impl FromIterator<(String, TypeRef)> for FieldSpec {
    fn from_iter<I: IntoIterator<Item = (String, TypeRef)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Structural identity of a shape, used as its cache key.
///
/// Base record name plus the normalized `(name, type)` entries sorted by
/// name, so the order in which fields were requested does not matter and
/// `List<Video>` and `Set<Video>` are indistinguishable. Field names are part
/// of the identity, which makes it finer than a key over field types alone:
/// two specs with the same field types but different names get different
/// shapes.
///
/// Equality and hashing use the entries themselves. The rendered form,
/// `Model_<Base>_<name>:<type>_...`, is for display only and may coincide
/// for distinct keys when names contain `_` or `:`.
#[derive(Clone, Debug)]
pub struct ShapeKey {
    base: String,
    entries: Vec<(String, TypeRef)>,
    rendered: String,
}

impl ShapeKey {
    pub fn compute(base: &str, spec: &FieldSpec) -> Self {
        let mut entries: Vec<(String, TypeRef)> = spec
            .iter()
            .map(|(name, ty)| (name.to_owned(), ty.normalize()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut rendered = format!("{MODEL_FIELD}_{base}");
        for (name, ty) in &entries {
            rendered.push('_');
            rendered.push_str(name);
            rendered.push(':');
            rendered.push_str(&ty.key_name());
        }
        Self {
            base: base.to_owned(),
            entries,
            rendered,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Normalized entries, sorted by field name.
    pub fn entries(&self) -> &[(String, TypeRef)] {
        &self.entries
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for ShapeKey {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.entries == other.entries
    }
}

impl Eq for ShapeKey {}

impl Hash for ShapeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base.hash(state);
        self.entries.hash(state);
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Process-unique shape number, assigned in synthesis order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ShapeId(pub u32);

/// One non-reserved field of a shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeField {
    name: String,
    ty: TypeRef,
    ordering: OrderingCapability,
}

impl ShapeField {
    pub fn new(name: impl Into<String>, ty: TypeRef, ordering: OrderingCapability) -> Self {
        Self {
            name: name.into(),
            ty,
            ordering,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Capability of the field's element type, resolved at synthesis.
    pub fn ordering(&self) -> &OrderingCapability {
        &self.ordering
    }
}

/// A synthesized record shape.
#[derive(Debug)]
pub struct Shape {
    id: ShapeId,
    key: ShapeKey,
    base: String,
    fields: Vec<ShapeField>,
}

impl Shape {
    /// Assemble a shape. Intended for synthesizers; everyone else obtains
    /// shapes from one.
    pub fn new(
        id: ShapeId,
        key: ShapeKey,
        base: impl Into<String>,
        fields: Vec<ShapeField>,
    ) -> Self {
        Self {
            id,
            key,
            base: base.into(),
            fields,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn key(&self) -> &ShapeKey {
        &self.key
    }

    /// Name of the record type the `Model` field refers to.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn model_type(&self) -> TypeRef {
        TypeRef::record(self.base.clone())
    }

    /// Fields excluding `Model`.
    pub fn fields(&self) -> &[ShapeField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ShapeField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// All field names, `Model` first.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(MODEL_FIELD).chain(self.fields.iter().map(|f| f.name.as_str()))
    }

    /// Type of any field, `Model` included.
    pub fn field_type(&self, name: &str) -> Option<TypeRef> {
        if name == MODEL_FIELD {
            return Some(self.model_type());
        }
        self.field(name).map(|f| f.ty.clone())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {MODEL_FIELD}: {}", self.key, self.base)?;
        for field in &self.fields {
            write!(f, ", {}: {}", field.name, field.ty)?;
        }
        f.write_str(" }")
    }
}

/// An instance of a shape.
///
/// Non-`Model` fields start out `Null`. Writes are checked against the
/// shape's field types.
#[derive(Clone, Debug)]
pub struct ShapeRecord {
    shape: Arc<Shape>,
    model: Arc<Record>,
    values: Vec<Value>,
}

impl ShapeRecord {
    pub fn new(shape: Arc<Shape>, model: Arc<Record>) -> Result<Self, ShapeError> {
        check_model(&shape, &model)?;
        let values = vec![Value::Null; shape.fields.len()];
        Ok(Self {
            shape,
            model,
            values,
        })
    }

    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// The record this instance was projected from.
    pub fn model(&self) -> &Arc<Record> {
        &self.model
    }

    /// Value of a non-`Model` field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.shape.field_index(name).map(|i| &self.values[i])
    }

    /// Write any field, `Model` included.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ShapeError> {
        if name == MODEL_FIELD {
            return match value {
                Value::Record(record) => self.set_model(record),
                other => Err(ShapeError::TypeMismatch {
                    field: MODEL_FIELD.to_owned(),
                    expected: self.shape.base.clone(),
                    found: other.kind_name(),
                }),
            };
        }

        let Some(index) = self.shape.field_index(name) else {
            return Err(ShapeError::UnknownField {
                shape: self.shape.key.to_string(),
                field: name.to_owned(),
            });
        };
        let ty = &self.shape.fields[index].ty;
        if !ty.accepts(&value) {
            return Err(ShapeError::TypeMismatch {
                field: name.to_owned(),
                expected: ty.to_string(),
                found: value.kind_name(),
            });
        }
        self.values[index] = value;
        Ok(())
    }

    pub fn set_model(&mut self, model: Arc<Record>) -> Result<(), ShapeError> {
        check_model(&self.shape, &model)?;
        self.model = model;
        Ok(())
    }

    /// Non-`Model` fields with their values, in shape order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.shape
            .fields
            .iter()
            .zip(&self.values)
            .map(|(f, v)| (f.name.as_str(), v))
    }
}

fn check_model(shape: &Shape, model: &Record) -> Result<(), ShapeError> {
    if model.type_name() != shape.base {
        return Err(ShapeError::ModelTypeMismatch {
            expected: shape.base.clone(),
            found: model.type_name().to_owned(),
        });
    }
    Ok(())
}

impl Serialize for ShapeRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(MODEL_FIELD, self.model.as_ref())?;
        for (name, value) in self.values() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
