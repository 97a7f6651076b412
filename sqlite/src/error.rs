//! Error types for the SQLite store.

use thiserror::Error;

/// Errors that can occur during SQLite store operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Creating or dropping tables failed.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Table prefix contains invalid characters.
    #[error("invalid prefix '{0}': must contain only alphanumeric characters and underscores")]
    InvalidPrefix(String),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;

impl From<SqliteError> for shellsense_db::StoreError {
    fn from(err: SqliteError) -> Self {
        shellsense_db::StoreError::Backend(err.to_string())
    }
}
