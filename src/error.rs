use thiserror::Error;

/// Convenience result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Convenience result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error type returned while building a [`crate::types::Dataset`] from a source file.
///
/// Any of these is fatal to startup: no dataset exists without a successful load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error (e.g. the header row is not valid UTF-8).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The source has no header row at all.
    #[error("empty input: {message}")]
    EmptyInput { message: String },

    /// The header row exists but cannot be used (e.g. every column name is blank).
    #[error("invalid header: {message}")]
    InvalidHeader { message: String },
}

/// Error type returned by query operations.
///
/// A query error is local to one invocation; the dataset is never affected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query needs a field that the source file's schema does not provide.
    #[error("required field missing: '{field}' is not present in the dataset schema")]
    FieldMissing { field: String },

    /// The query asked for a numeric aggregate over a text field.
    #[error("field '{field}' is not numeric")]
    NonNumericField { field: String },
}

impl QueryError {
    pub(crate) fn field_missing(field: impl Into<String>) -> Self {
        Self::FieldMissing {
            field: field.into(),
        }
    }
}
