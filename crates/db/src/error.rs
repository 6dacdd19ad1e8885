//! Backend-agnostic error returned by every repository capability.

/// Error returned by repository implementations.
///
/// `NotFound` is always an error: no repository method returns a zero-value
/// record in place of a missing row.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("Record not found")]
    NotFound,

    /// A unique constraint rejected the write. Holds the constraint name.
    #[error("Duplicate value violates unique constraint: {0}")]
    UniqueViolation(String),

    /// The caller cancelled the operation before the store answered.
    #[error("Operation cancelled")]
    Cancelled,

    /// Any other storage failure (connection, query, decoding).
    #[error("Storage error: {0}")]
    Backend(String),
}

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::UniqueViolation(db_err.constraint().unwrap_or("unknown").to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}
