use relshape_core::SchemaError;

/// Broad class of a compiler failure.
///
/// Neither class is retryable: the same input fails the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed.
    InvalidInput,
    /// The request is well-formed but cannot be turned into a shape.
    SynthesisConflict,
}

/// Errors raised by the shape cache.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthError {
    #[error("field specification must contain at least one field")]
    EmptySpec,

    #[error("field `Model` is reserved for the back-reference to the source record")]
    ReservedFieldName,

    #[error("base record type `{0}` is not registered")]
    UnknownRecordType(String),

    #[error("shape cache holds the maximum number of shapes")]
    CacheFull,
}

impl SynthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthError::EmptySpec | SynthError::UnknownRecordType(_) => ErrorKind::InvalidInput,
            SynthError::ReservedFieldName | SynthError::CacheFull => ErrorKind::SynthesisConflict,
        }
    }
}

/// Errors raised while compiling a projection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("selector `{selector}` is not a direct member access on `{record}`")]
    InvalidSelector { record: String, selector: String },

    #[error("ordering requested on `{field}`, which is not a sequence")]
    NotASequence { field: String },

    #[error("query over `{0}` is already projected")]
    AlreadyProjected(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Synth(#[from] SynthError),
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Synth(e) => e.kind(),
            CompileError::InvalidSelector { .. }
            | CompileError::NotASequence { .. }
            | CompileError::AlreadyProjected(_)
            | CompileError::Schema(_) => ErrorKind::InvalidInput,
        }
    }
}
