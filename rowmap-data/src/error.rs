/// Errors that can occur in the data layer.
///
/// `Declaration` is a programmer error (an entity declared without the key an
/// operation needs). Everything surfaced from the driver lands in `Database`
/// with the original message intact.
#[derive(Debug)]
pub enum DataError {
    /// The entity declaration cannot support the requested operation.
    Declaration(String),
    /// A statement that must return a row returned none.
    NotFound(String),
    /// Driver-level failure: connection, malformed SQL, constraint violation.
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// A column value could not be converted to the requested Rust type.
    Decode {
        column: String,
        expected: &'static str,
    },
    /// A counter row changed underneath a key allocation.
    Conflict(String),
    /// The active SQL dialect cannot express the requested statement.
    Unsupported(String),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `rowmap-data-sqlx`) to wrap driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    pub fn declaration(msg: impl Into<String>) -> Self {
        DataError::Declaration(msg.into())
    }

    pub fn decode(column: &str, expected: &'static str) -> Self {
        DataError::Decode {
            column: column.to_string(),
            expected,
        }
    }

    /// Whether this is the "no such row" condition rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Declaration(msg) => write!(f, "Declaration error: {msg}"),
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Decode { column, expected } => {
                write!(f, "Decode error for column '{column}': expected {expected}")
            }
            DataError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            DataError::Unsupported(msg) => write!(f, "Unsupported: {msg}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
