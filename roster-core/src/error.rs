//! Error types for reviewer roster operations

use std::fmt;

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Team,
    User,
    PullRequest,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Team => "team",
            Entity::User => "user",
            Entity::PullRequest => "pull request",
        };
        f.write_str(name)
    }
}

/// Error type for roster operations
///
/// Domain variants are returned as-is from the services so callers can match
/// on them. `Store` wraps opaque failures of the persistence gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested record does not exist
    #[error("{entity} '{id}' not found")]
    NotFound { entity: Entity, id: String },

    /// Uniqueness constraint violated on insert
    #[error("{entity} '{id}' already exists")]
    AlreadyExists { entity: Entity, id: String },

    /// No active team member is left to review the pull request
    #[error("no active replacement candidate in team for pull request '{0}'")]
    NoCandidate(String),

    /// Reviewer changes are not allowed once merged
    #[error("cannot reassign on merged pull request '{0}'")]
    PrMerged(String),

    /// The reviewer being replaced is not assigned to the pull request
    #[error("reviewer '{reviewer}' is not assigned to pull request '{pull_request}'")]
    NotAssigned {
        pull_request: String,
        reviewer: String,
    },

    /// The pull request changed underneath this unit of work
    #[error("pull request '{0}' was modified concurrently")]
    Conflict(String),

    /// Input rejected before reaching the store
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence gateway failure
    #[error("storage error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Shorthand for a missing record
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a duplicate record
    pub fn already_exists(entity: Entity, id: impl Into<String>) -> Self {
        Error::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    /// Wrap an infrastructure error from a store implementation
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Store(Box::new(err))
    }

    /// Whether the error is a domain outcome rather than an infrastructure failure
    pub fn is_domain(&self) -> bool {
        !matches!(self, Error::Store(_) | Error::Io(_) | Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::not_found(Entity::PullRequest, "pr-1").to_string(),
            "pull request 'pr-1' not found"
        );
        assert_eq!(
            Error::already_exists(Entity::Team, "backend").to_string(),
            "team 'backend' already exists"
        );
        assert_eq!(
            Error::NotAssigned {
                pull_request: "pr-1".into(),
                reviewer: "u2".into()
            }
            .to_string(),
            "reviewer 'u2' is not assigned to pull request 'pr-1'"
        );
        assert_eq!(
            Error::InvalidInput("team_name is required".into()).to_string(),
            "invalid input: team_name is required"
        );
        assert_eq!(
            Error::Config("unknown strategy 'fastest'".into()).to_string(),
            "configuration error: unknown strategy 'fastest'"
        );
    }

    #[test]
    fn test_domain_classification() {
        assert!(Error::NoCandidate("pr-1".into()).is_domain());
        assert!(Error::Conflict("pr-1".into()).is_domain());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert!(!Error::store(io).is_domain());
    }
}
