use relshape_core::{SchemaError, ShapeError};

/// Errors raised while translating or executing a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("`{element}` has no member `{member}`")]
    MissingMember { member: String, element: String },

    #[error("expected a `{expected}` row, found `{found}`")]
    UnexpectedRecordType { expected: String, found: String },

    #[error("projection onto `{shape}` cannot apply to `{element}` rows")]
    ProjectionMismatch { shape: String, element: String },

    #[error("row limit exceeded ({limit} rows)")]
    RowLimitExceeded { limit: usize },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
