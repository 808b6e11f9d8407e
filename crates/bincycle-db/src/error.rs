//! Database errors

use bincycle_types::ParseEnumError;
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be mapped onto a domain type
    #[error("invalid stored value: {0}")]
    Decode(String),

    /// Record not found
    #[error("record not found")]
    NotFound,
}

impl From<ParseEnumError> for DbError {
    fn from(err: ParseEnumError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;
