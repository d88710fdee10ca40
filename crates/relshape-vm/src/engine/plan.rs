use std::fmt;
use std::sync::Arc;

use relshape_core::Record;
use relshape_ir::Stage;
use tracing::debug;

use super::error::RuntimeError;
use super::exec::ExecLimits;
use super::operator::{FilterOperator, Operator, ProjectOperator, ScanOperator, SortOperator};
use super::row::Row;

/// A translated query, ready to run.
///
/// Produced by `Engine::translate`, which has already checked every member
/// reference against the schema. A plan can be executed any number of times.
#[derive(Clone, Debug)]
pub struct Plan {
    source: String,
    stages: Vec<Stage>,
    limits: ExecLimits,
}

impl Plan {
    pub(crate) fn new(source: impl Into<String>, stages: Vec<Stage>, limits: ExecLimits) -> Self {
        Self {
            source: source.into(),
            stages,
            limits,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn limits(&self) -> &ExecLimits {
        &self.limits
    }

    /// Run the plan over `rows`, which must all be records of the source type.
    pub fn execute<'a, I>(&'a self, rows: I) -> Result<Vec<Row>, RuntimeError>
    where
        I: IntoIterator<Item = Arc<Record>>,
        I::IntoIter: 'a,
    {
        let mut op: Box<dyn Operator + 'a> = Box::new(ScanOperator::new(
            &self.source,
            rows,
            self.limits.row_limit,
        ));
        for stage in &self.stages {
            op = match stage {
                Stage::Filter(predicate) => Box::new(FilterOperator::new(op, predicate)),
                Stage::Sort(keys) => Box::new(SortOperator::new(op, keys)),
                Stage::Project(projection) => Box::new(ProjectOperator::new(op, projection)),
            };
        }

        let mut out = Vec::new();
        while let Some(row) = op.next()? {
            out.push(row);
        }

        debug!(
            source = %self.source,
            examined = op.rows_examined(),
            returned = out.len(),
            "executed plan"
        );
        Ok(out)
    }
}

/// One operator per line, scan first.
impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scan {}", self.source)?;
        for stage in &self.stages {
            match stage {
                Stage::Filter(predicate) => writeln!(f, "filter {predicate}")?,
                Stage::Sort(keys) => {
                    f.write_str("sort")?;
                    for (i, key) in keys.iter().enumerate() {
                        let sep = if i == 0 { " " } else { ", " };
                        write!(f, "{sep}{} {}", key.member, key.direction)?;
                    }
                    writeln!(f)?;
                }
                Stage::Project(projection) => {
                    writeln!(f, "project {}", projection.shape().key())?;
                    for binding in projection.bindings() {
                        let Some(order) = &binding.order else {
                            continue;
                        };
                        writeln!(
                            f,
                            "  order {} by {} {}",
                            binding.field, order.key, order.direction
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}
