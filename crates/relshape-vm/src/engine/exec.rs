//! Engine entry point and execution limits.

use std::sync::Arc;

use relshape_core::{Record, RecordType, Schema, Shape, ShapeError};
use relshape_ir::{BindingSource, Projection, Query, Stage};
use tracing::debug;

use super::error::RuntimeError;
use super::plan::Plan;
use super::row::Row;

/// Runtime limits for query execution.
#[derive(Clone, Copy, Debug)]
pub struct ExecLimits {
    /// Maximum source rows scanned per execution (default: 1,000,000).
    pub(crate) row_limit: usize,
}

impl Default for ExecLimits {
    fn default() -> Self {
        Self {
            row_limit: 1_000_000,
        }
    }
}

impl ExecLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scanned-row budget.
    pub fn row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    pub fn get_row_limit(&self) -> usize {
        self.row_limit
    }
}

/// Element type a stage sees, tracked during translation.
#[derive(Clone, Copy)]
enum Element<'a> {
    Record(&'a RecordType),
    Shape(&'a Shape),
}

impl Element<'_> {
    fn name(&self) -> String {
        match self {
            Element::Record(record) => record.name().to_owned(),
            Element::Shape(shape) => shape.key().to_string(),
        }
    }

    fn check_member(&self, member: &str) -> Result<(), RuntimeError> {
        let found = match self {
            Element::Record(record) => record.has_member(member),
            Element::Shape(shape) => shape.field_type(member).is_some(),
        };
        if found {
            Ok(())
        } else {
            Err(RuntimeError::MissingMember {
                member: member.to_owned(),
                element: self.name(),
            })
        }
    }
}

/// Translates queries over one schema into executable plans.
pub struct Engine<'s> {
    schema: &'s Schema,
    limits: ExecLimits,
}

impl<'s> Engine<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            limits: ExecLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ExecLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ExecLimits {
        &self.limits
    }

    /// Check `query` against the schema and lower it into a plan.
    pub fn translate(&self, query: &Query) -> Result<Plan, RuntimeError> {
        let source = self.schema.resolve(query.source())?;
        let mut element = Element::Record(source);

        for stage in query.stages() {
            match stage {
                Stage::Filter(predicate) => {
                    for member in predicate.members() {
                        element.check_member(member)?;
                    }
                }
                Stage::Sort(keys) => {
                    for key in keys {
                        element.check_member(&key.member)?;
                    }
                }
                Stage::Project(projection) => {
                    let Element::Record(record) = element else {
                        return Err(RuntimeError::ProjectionMismatch {
                            shape: projection.shape().key().to_string(),
                            element: element.name(),
                        });
                    };
                    self.check_projection(record, projection)?;
                    element = Element::Shape(projection.shape());
                }
            }
        }

        debug!(
            source = query.source(),
            stages = query.stages().len(),
            "translated query"
        );
        Ok(Plan::new(query.source(), query.stages().to_vec(), self.limits))
    }

    /// Translate and execute in one step.
    pub fn run<I>(&self, query: &Query, rows: I) -> Result<Vec<Row>, RuntimeError>
    where
        I: IntoIterator<Item = Arc<Record>>,
    {
        let plan = self.translate(query)?;
        plan.execute(rows)
    }

    fn check_projection(
        &self,
        record: &RecordType,
        projection: &Projection,
    ) -> Result<(), RuntimeError> {
        let shape = projection.shape();
        if shape.base() != record.name() {
            return Err(RuntimeError::ProjectionMismatch {
                shape: shape.key().to_string(),
                element: record.name().to_owned(),
            });
        }

        for binding in projection.bindings() {
            if shape.field_type(&binding.field).is_none() {
                return Err(ShapeError::UnknownField {
                    shape: shape.key().to_string(),
                    field: binding.field.clone(),
                }
                .into());
            }
            let BindingSource::Member(member) = &binding.source else {
                continue;
            };
            let ty = record
                .member(member)
                .ok_or_else(|| RuntimeError::MissingMember {
                    member: member.clone(),
                    element: record.name().to_owned(),
                })?;

            let Some(order) = &binding.order else {
                continue;
            };
            let known = ty
                .element()
                .and_then(|element| element.record_name())
                .and_then(|name| self.schema.get(name));
            if let Some(element) = known {
                Element::Record(element).check_member(&order.key)?;
            }
        }
        Ok(())
    }
}
