use rowmap_data::DataError;

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// The orphan rule forbids `From<sqlx::Error> for DataError` here, so
/// conversions go through `.into_data_error()`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("row not found".into()),
            sqlx::Error::ColumnNotFound(column) => DataError::decode(column, "existing column"),
            _ => DataError::database(self),
        }
    }
}

/// Convenience alias for data-layer results using `DataError`.
pub type SqlxResult<T> = Result<T, DataError>;
