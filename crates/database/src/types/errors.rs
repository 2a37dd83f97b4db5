//! Error types for the database layer

use thiserror::Error;

/// Connection and schema errors raised while bootstrapping the store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Errors raised by the user, like and gist repositories.
///
/// Store failures are carried as the original `sqlx::Error`, nothing is
/// retried or rewritten on the way out.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Gist not found")]
    GistNotFound,

    #[error("Gist already forked by this user")]
    AlreadyForked,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

impl UserError {
    /// Map a write failure, turning unique violations on usernames and forks into conflicts
    pub(crate) fn from_write(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() && db_error.message().contains("users.username") {
                return UserError::UsernameAlreadyExists;
            }
            if db_error.is_unique_violation() && db_error.message().contains("gists.forked_id") {
                return UserError::AlreadyForked;
            }
        }
        UserError::Store(error)
    }
}
