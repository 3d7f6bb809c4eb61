//! Repository Module
//!
//! CRUD and query operations over the SQLite tables. Repositories are free
//! async functions taking the pool; business rules (role and state gating)
//! live in the service layer.

pub mod owner;
pub mod shipment;

use thiserror::Error;

/// Repository error types
///
/// `NotFound` and `Validation` are expected control flow and are never
/// logged as errors; `Database` is a storage fault.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
