use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::timer::TimerError};

/// Errors that can occur in service layer operations.
///
/// `NotFound`, `Unauthorized`, `InvalidState`, and `InvalidInput` are
/// expected, user-facing outcomes and are surfaced as-is. `Internal` means a
/// stored invariant was violated; it is logged at the point of detection and
/// must propagate unchanged. An outer boundary maps `InvalidState` to an
/// HTTP 409 Conflict.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Caller holds no grant, or the referenced record does not exist.
    ///
    /// Absence of a grant is deliberately indistinguishable from absence of
    /// the record itself.
    #[error("not found: {0}")]
    NotFound(String),
    /// Grant exists but its permission does not allow the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation is not legal in the current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A stored invariant was violated; indicates a bug, never retried.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { .. } => ServiceError::Unavailable(err),
            // A batch referenced a row that vanished between the gating read
            // and the write; surfaced the same way as the read failing.
            StorageError::MissingRow { ref description } => {
                ServiceError::NotFound(description.clone())
            }
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

impl From<TimerError> for ServiceError {
    fn from(err: TimerError) -> Self {
        match err {
            TimerError::MissingStartTime | TimerError::NotRunning => {
                ServiceError::Internal(err.to_string())
            }
            TimerError::Finished => ServiceError::InvalidState(err.to_string()),
        }
    }
}
