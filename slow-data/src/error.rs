use crate::query::QueryError;

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    /// Connection, constraint or statement failure reported by storage.
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// The caller's [`ExecContext`](crate::ExecContext) was cancelled.
    Cancelled,
    /// The caller's deadline passed, including while waiting for a pooled connection.
    DeadlineExceeded,
    /// An update would have matched every row of the table.
    MissingWhereClause(&'static str),
    Query(QueryError),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `slow-data-sqlx`) to wrap driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    /// `true` for [`Cancelled`](DataError::Cancelled) and [`DeadlineExceeded`](DataError::DeadlineExceeded).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DataError::Cancelled | DataError::DeadlineExceeded)
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Cancelled => write!(f, "Operation cancelled"),
            DataError::DeadlineExceeded => write!(f, "Operation deadline exceeded"),
            DataError::MissingWhereClause(table) => {
                write!(f, "Refusing unscoped update of table '{table}'")
            }
            DataError::Query(err) => write!(f, "Query error: {err}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            DataError::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for DataError {
    fn from(err: QueryError) -> Self {
        DataError::Query(err)
    }
}

impl From<DataError> for slow_core::AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Cancelled | DataError::DeadlineExceeded => {
                slow_core::AppError::Cancelled(err.to_string())
            }
            other => slow_core::AppError::Storage(other.to_string()),
        }
    }
}
