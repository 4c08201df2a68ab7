//! Mapping of roster errors onto HTTP responses

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roster_core::{Entity, Error};
use serde::Serialize;

/// JSON error body: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// Wrapper to make roster errors usable as axum error responses
#[derive(Debug)]
pub struct ApiErr(pub Error);

impl ApiErr {
    /// Status and stable error code for the wrapped error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::AlreadyExists {
                entity: Entity::Team,
                ..
            } => (StatusCode::BAD_REQUEST, "TEAM_EXISTS"),
            Error::AlreadyExists {
                entity: Entity::PullRequest,
                ..
            } => (StatusCode::CONFLICT, "PR_EXISTS"),
            Error::AlreadyExists { .. } | Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Error::NoCandidate(_) => (StatusCode::CONFLICT, "NO_CANDIDATE"),
            Error::PrMerged(_) => (StatusCode::CONFLICT, "PR_MERGED"),
            Error::NotAssigned { .. } => (StatusCode::CONFLICT, "NOT_ASSIGNED"),
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Error::Config(_) | Error::Io(_) | Error::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}

impl From<Error> for ApiErr {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::InvalidInput(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::InvalidInput(rejection.body_text()))
    }
}

/// Shorthand for request validation failures
pub fn bad_request(message: impl Into<String>) -> ApiErr {
    ApiErr(Error::InvalidInput(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: Error) -> (StatusCode, &'static str) {
        ApiErr(err).status_and_code()
    }

    #[test]
    fn test_domain_error_codes() {
        assert_eq!(
            code_of(Error::already_exists(Entity::Team, "backend")),
            (StatusCode::BAD_REQUEST, "TEAM_EXISTS")
        );
        assert_eq!(
            code_of(Error::already_exists(Entity::PullRequest, "pr-1")),
            (StatusCode::CONFLICT, "PR_EXISTS")
        );
        assert_eq!(
            code_of(Error::not_found(Entity::User, "u1")),
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        );
        assert_eq!(
            code_of(Error::PrMerged("pr-1".into())),
            (StatusCode::CONFLICT, "PR_MERGED")
        );
        assert_eq!(
            code_of(Error::Conflict("pr-1".into())),
            (StatusCode::CONFLICT, "CONFLICT")
        );
    }

    #[test]
    fn test_infrastructure_errors_hide_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let response = ApiErr(Error::store(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
