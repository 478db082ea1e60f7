/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    /// Malformed caller input: bad paging parameters, invalid identifiers,
    /// a write with no eligible columns.
    InvalidArgument(String),
    /// A lookup matched no row. Read operations that can legitimately miss
    /// (`find_first`, `max`) return `Option` instead of this variant.
    NotFound(String),
    /// An entity type failed registration-time validation (e.g. more than
    /// one identity field).
    Schema(String),
    /// Transaction lifecycle misuse: begin while one is open, commit or
    /// rollback with none open.
    Transaction(String),
    /// Failure raised by the underlying store.
    Database(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates to wrap driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Schema(msg) => write!(f, "Schema error: {msg}"),
            DataError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
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
