//! The deferred query.
//!
//! A `Query` describes a fetch over one record type as a list of stages. It is
//! a value: every builder method returns a new query and nothing is evaluated
//! until an engine translates and runs it.

use std::fmt;
use std::sync::Arc;

use relshape_core::Shape;

use crate::predicate::Predicate;
use crate::projection::Projection;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub member: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn new(member: impl Into<String>, direction: Direction) -> Self {
        Self {
            member: member.into(),
            direction,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    Filter(Predicate),
    /// Multi-key sort; earlier keys take precedence.
    Sort(Vec<SortKey>),
    Project(Projection),
}

/// What a query yields at its current last stage.
#[derive(Clone, Copy, Debug)]
pub enum ElementType<'q> {
    Record(&'q str),
    Shape(&'q Arc<Shape>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    source: String,
    stages: Vec<Stage>,
}

impl Query {
    /// Query every record of a record type.
    pub fn over(record_type: impl Into<String>) -> Self {
        Self {
            source: record_type.into(),
            stages: Vec::new(),
        }
    }

    /// Name of the record type the query starts from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.stages.push(Stage::Filter(predicate));
        self
    }

    /// Start a new sort on `member`.
    pub fn order_by(mut self, member: impl Into<String>, direction: Direction) -> Self {
        self.stages
            .push(Stage::Sort(vec![SortKey::new(member, direction)]));
        self
    }

    /// Add a tie-breaking key to the sort that ends this query.
    ///
    /// When the query does not currently end in a sort, this starts one.
    pub fn then_by(mut self, member: impl Into<String>, direction: Direction) -> Self {
        match self.stages.last_mut() {
            Some(Stage::Sort(keys)) => {
                keys.push(SortKey::new(member, direction));
                self
            }
            _ => self.order_by(member, direction),
        }
    }

    /// Append a projection stage.
    pub fn project(mut self, projection: Projection) -> Self {
        self.stages.push(Stage::Project(projection));
        self
    }

    /// The projection stage, if one has been applied.
    pub fn projection(&self) -> Option<&Projection> {
        self.stages.iter().rev().find_map(|stage| match stage {
            Stage::Project(p) => Some(p),
            _ => None,
        })
    }

    pub fn is_projected(&self) -> bool {
        self.projection().is_some()
    }

    pub fn element_type(&self) -> ElementType<'_> {
        match self.projection() {
            Some(p) => ElementType::Shape(p.shape()),
            None => ElementType::Record(&self.source),
        }
    }
}
