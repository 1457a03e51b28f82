use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failed operation.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A batch mutation referenced a row that does not exist.
    ///
    /// Backends must detect this before applying any row of the batch, so a
    /// batch either applies completely or not at all.
    #[error("missing row: {description}")]
    MissingRow {
        /// Which row was expected and not found.
        description: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a missing-row error for a rejected batch mutation.
    pub fn missing_row(description: impl Into<String>) -> Self {
        StorageError::MissingRow {
            description: description.into(),
        }
    }
}
