use reposit_data::DataError;

/// Application-level errors for the invoicing demo.
#[derive(Debug)]
pub enum AppError {
    /// A referenced row (customer, track) does not exist.
    NotFound(String),
    /// Failure bubbled up from the data layer.
    Data(DataError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::Data(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Data(err) => Some(err),
            AppError::NotFound(_) => None,
        }
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::Data(err)
    }
}
