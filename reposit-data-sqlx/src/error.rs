use reposit_data::DataError;

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Orphan rules forbid a `From<sqlx::Error> for DataError` impl outside the
/// defining crates, so the conversion lives on this trait instead:
/// `.into_data_error()`, usually inside a `map_err`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("row not found".into()),
            _ => DataError::database(self),
        }
    }
}

/// Result alias for operations that fail with [`DataError`].
pub type SqlxResult<T> = Result<T, DataError>;
