use std::borrow::Cow;
use std::sync::Arc;

use relshape_core::{MODEL_FIELD, Record, ShapeRecord, Value};
use serde::ser::{Serialize, Serializer};

/// One element flowing through a plan.
///
/// Rows start out as source records and become shape instances once a
/// projection stage has run.
#[derive(Clone, Debug)]
pub enum Row {
    Record(Arc<Record>),
    Shape(ShapeRecord),
}

impl Row {
    /// Record type name, or the shape key for projected rows.
    pub fn type_name(&self) -> &str {
        match self {
            Row::Record(record) => record.type_name(),
            Row::Shape(instance) => instance.shape().key().as_str(),
        }
    }

    /// Read a member. On shape rows, `Model` yields the source record.
    pub fn member(&self, name: &str) -> Option<Cow<'_, Value>> {
        match self {
            Row::Record(record) => record.get(name).map(Cow::Borrowed),
            Row::Shape(instance) if name == MODEL_FIELD => {
                Some(Cow::Owned(Value::Record(Arc::clone(instance.model()))))
            }
            Row::Shape(instance) => instance.get(name).map(Cow::Borrowed),
        }
    }

    pub fn as_record(&self) -> Option<&Arc<Record>> {
        match self {
            Row::Record(record) => Some(record),
            Row::Shape(_) => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeRecord> {
        match self {
            Row::Shape(instance) => Some(instance),
            Row::Record(_) => None,
        }
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Row::Record(record) => record.as_ref().serialize(serializer),
            Row::Shape(instance) => instance.serialize(serializer),
        }
    }
}
