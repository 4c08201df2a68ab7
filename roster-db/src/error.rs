//! Error types for database operations

use roster_core::Entity;
use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Row content that does not map onto the domain model
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Unique constraint hit on insert
    #[error("{entity} '{id}' already exists")]
    Duplicate { entity: Entity, id: String },

    /// Referenced row does not exist
    #[error("{entity} '{id}' not found")]
    Missing { entity: Entity, id: String },

    /// Guarded update matched no row
    #[error("pull request '{0}' changed since it was read")]
    StaleVersion(String),

    /// Reviewer row to delete does not exist
    #[error("reviewer '{reviewer}' is not assigned to pull request '{pull_request}'")]
    NotAssigned {
        pull_request: String,
        reviewer: String,
    },
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify an insert failure, keeping unrelated errors as-is
    pub(crate) fn on_insert(err: sqlx::Error, entity: Entity, id: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Error::Duplicate {
                    entity,
                    id: id.to_string(),
                };
            }
        }
        Error::Sqlx(err)
    }

    /// Classify a foreign key failure as a missing referenced row
    pub(crate) fn on_reference(err: Error, entity: Entity, id: &str) -> Self {
        if let Error::Sqlx(sqlx::Error::Database(db)) = &err {
            if db.is_foreign_key_violation() {
                return Error::Missing {
                    entity,
                    id: id.to_string(),
                };
            }
        }
        err
    }
}

impl From<Error> for roster_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Duplicate { entity, id } => roster_core::Error::AlreadyExists { entity, id },
            Error::Missing { entity, id } => roster_core::Error::NotFound { entity, id },
            Error::StaleVersion(pr) => roster_core::Error::Conflict(pr),
            Error::NotAssigned {
                pull_request,
                reviewer,
            } => roster_core::Error::NotAssigned {
                pull_request,
                reviewer,
            },
            other => roster_core::Error::store(other),
        }
    }
}
