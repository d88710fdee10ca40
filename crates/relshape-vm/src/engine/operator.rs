//! Pull-based operators.
//!
//! Each operator pulls rows from its child on demand. Sort is the only
//! blocking operator: it drains its child on the first pull.

use std::sync::Arc;

use relshape_core::{Record, ShapeRecord, Value};
use relshape_ir::{BindingSource, Predicate, Projection, SortKey};
use tracing::{trace, warn};

use super::error::RuntimeError;
use super::eval::{compare_keys, eval_predicate, member_of, order_sequence};
use super::row::Row;

pub(crate) trait Operator {
    fn next(&mut self) -> Result<Option<Row>, RuntimeError>;

    fn rows_examined(&self) -> usize {
        0
    }
}

pub(crate) struct ScanOperator<'a> {
    source: &'a str,
    rows: Box<dyn Iterator<Item = Arc<Record>> + 'a>,
    row_limit: usize,
    examined: usize,
}

impl<'a> ScanOperator<'a> {
    pub(crate) fn new<I>(source: &'a str, rows: I, row_limit: usize) -> Self
    where
        I: IntoIterator<Item = Arc<Record>>,
        I::IntoIter: 'a,
    {
        Self {
            source,
            rows: Box::new(rows.into_iter()),
            row_limit,
            examined: 0,
        }
    }
}

impl Operator for ScanOperator<'_> {
    fn next(&mut self) -> Result<Option<Row>, RuntimeError> {
        let Some(record) = self.rows.next() else {
            return Ok(None);
        };
        if self.examined >= self.row_limit {
            warn!(limit = self.row_limit, source = self.source, "row limit exceeded");
            return Err(RuntimeError::RowLimitExceeded {
                limit: self.row_limit,
            });
        }
        self.examined += 1;

        if record.type_name() != self.source {
            return Err(RuntimeError::UnexpectedRecordType {
                expected: self.source.to_owned(),
                found: record.type_name().to_owned(),
            });
        }
        Ok(Some(Row::Record(record)))
    }

    fn rows_examined(&self) -> usize {
        self.examined
    }
}

pub(crate) struct FilterOperator<'a> {
    child: Box<dyn Operator + 'a>,
    predicate: &'a Predicate,
}

impl<'a> FilterOperator<'a> {
    pub(crate) fn new(child: Box<dyn Operator + 'a>, predicate: &'a Predicate) -> Self {
        Self { child, predicate }
    }
}

impl Operator for FilterOperator<'_> {
    fn next(&mut self) -> Result<Option<Row>, RuntimeError> {
        while let Some(row) = self.child.next()? {
            if eval_predicate(self.predicate, &row)? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn rows_examined(&self) -> usize {
        self.child.rows_examined()
    }
}

pub(crate) struct SortOperator<'a> {
    child: Box<dyn Operator + 'a>,
    keys: &'a [SortKey],
    sorted: Option<std::vec::IntoIter<Row>>,
}

impl<'a> SortOperator<'a> {
    pub(crate) fn new(child: Box<dyn Operator + 'a>, keys: &'a [SortKey]) -> Self {
        Self {
            child,
            keys,
            sorted: None,
        }
    }

    fn materialize(&mut self) -> Result<Vec<Row>, RuntimeError> {
        let keys = self.keys;
        let mut keyed = Vec::new();
        while let Some(row) = self.child.next()? {
            let values = keys
                .iter()
                .map(|key| member_of(&row, &key.member).map(|v| v.into_owned()))
                .collect::<Result<Vec<Value>, _>>()?;
            keyed.push((values, row));
        }

        keyed.sort_by(|(a, _), (b, _)| {
            a.iter()
                .zip(b)
                .zip(keys)
                .map(|((a, b), key)| compare_keys(a, b, key.direction))
                .find(|ord| !ord.is_eq())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }
}

impl Operator for SortOperator<'_> {
    fn next(&mut self) -> Result<Option<Row>, RuntimeError> {
        if self.sorted.is_none() {
            let rows = self.materialize()?;
            self.sorted = Some(rows.into_iter());
        }
        Ok(self.sorted.as_mut().and_then(Iterator::next))
    }

    fn rows_examined(&self) -> usize {
        self.child.rows_examined()
    }
}

pub(crate) struct ProjectOperator<'a> {
    child: Box<dyn Operator + 'a>,
    projection: &'a Projection,
}

impl<'a> ProjectOperator<'a> {
    pub(crate) fn new(child: Box<dyn Operator + 'a>, projection: &'a Projection) -> Self {
        Self { child, projection }
    }

    fn project(&self, record: &Arc<Record>) -> Result<ShapeRecord, RuntimeError> {
        let shape = self.projection.shape();
        let mut instance = ShapeRecord::new(Arc::clone(shape), Arc::clone(record))?;

        for binding in self.projection.bindings() {
            let value = match &binding.source {
                BindingSource::Record => Value::Record(Arc::clone(record)),
                BindingSource::Member(member) => {
                    let value = record.get(member).ok_or_else(|| RuntimeError::MissingMember {
                        member: member.clone(),
                        element: record.type_name().to_owned(),
                    })?;
                    match (&binding.order, value) {
                        (Some(order), Value::Collection(items)) => {
                            Value::Collection(order_sequence(items, &order.key, order.direction)?)
                        }
                        _ => value.clone(),
                    }
                }
            };
            instance.set(&binding.field, value)?;
        }

        trace!(shape = %shape.key(), "projected row");
        Ok(instance)
    }
}

impl Operator for ProjectOperator<'_> {
    fn next(&mut self) -> Result<Option<Row>, RuntimeError> {
        let Some(row) = self.child.next()? else {
            return Ok(None);
        };
        match row {
            Row::Record(record) => Ok(Some(Row::Shape(self.project(&record)?))),
            Row::Shape(instance) => Err(RuntimeError::ProjectionMismatch {
                shape: self.projection.shape().key().to_string(),
                element: instance.shape().key().to_string(),
            }),
        }
    }

    fn rows_examined(&self) -> usize {
        self.child.rows_examined()
    }
}
