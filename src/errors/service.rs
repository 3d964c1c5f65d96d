use thiserror::Error;

use super::RepositoryError;

/// Error type for link and analytics operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed URL, alias or expiry
    #[error("Validation error: {0}")]
    Validation(String),

    /// Alias already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown short code
    #[error("Not found: {0}")]
    NotFound(String),

    /// The link exists but its expiry has passed
    #[error("Expired: {0}")]
    Expired(String),

    /// No free random code within the attempt budget
    #[error("Exhausted: {0}")]
    Exhausted(String),

    /// Store failure that is not a domain condition
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::InvalidData(msg) => Self::Validation(msg),
            err @ RepositoryError::Database(_) => Self::Repository(err),
        }
    }
}
