use slow_data::DataError;

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for DataError`
/// in this crate. Use `.into_data_error()` (or `map_err(SqlxErrorExt::into_data_error)`).
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".into()),
            // Waiting for a pooled connection ran past `acquire_timeout`.
            sqlx::Error::PoolTimedOut => DataError::DeadlineExceeded,
            _ => DataError::database(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_a_deadline() {
        assert!(matches!(
            sqlx::Error::PoolTimedOut.into_data_error(),
            DataError::DeadlineExceeded
        ));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            sqlx::Error::RowNotFound.into_data_error(),
            DataError::NotFound(_)
        ));
    }

    #[test]
    fn other_errors_are_database_errors() {
        let err = sqlx::Error::Protocol("bad packet".into()).into_data_error();
        assert!(matches!(err, DataError::Database(_)));
        assert!(!err.is_cancellation());
    }
}
