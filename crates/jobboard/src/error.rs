use crate::applications::ApplicationStatus;
use crate::config::ConfigError;
use crate::storage::RepositoryError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Process-level failures raised while starting or running the service.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Board(BoardError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Board(err) => write!(f, "job board error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Board(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<BoardError> for AppError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

/// Typed outcome taxonomy surfaced by every core operation.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("forbidden")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    #[error("an application for this job already exists")]
    DuplicateApplication,
    #[error("application is already {current}; status can no longer change")]
    IllegalTransition { current: ApplicationStatus },
    #[error("an application cannot be moved to {requested}")]
    UnsupportedTransition { requested: ApplicationStatus },
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired credential")]
    InvalidOrExpiredCredential,
    #[error("credential could not be issued: {0}")]
    CredentialIssue(jsonwebtoken::errors::Error),
    #[error(transparent)]
    Storage(RepositoryError),
}

impl BoardError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code for the response body.
    pub const fn kind(&self) -> &'static str {
        match self {
            BoardError::Validation(_) => "validation_error",
            BoardError::Forbidden => "forbidden",
            BoardError::NotFound => "not_found",
            BoardError::DuplicateApplication => "duplicate_application",
            BoardError::IllegalTransition { .. } | BoardError::UnsupportedTransition { .. } => {
                "illegal_transition"
            }
            BoardError::DuplicateEmail => "duplicate_email",
            BoardError::InvalidCredentials => "invalid_credentials",
            BoardError::InvalidOrExpiredCredential => "invalid_or_expired_credential",
            BoardError::CredentialIssue(_) => "credential_error",
            BoardError::Storage(_) => "storage_error",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            BoardError::Validation(_) => StatusCode::BAD_REQUEST,
            BoardError::InvalidCredentials | BoardError::InvalidOrExpiredCredential => {
                StatusCode::UNAUTHORIZED
            }
            BoardError::Forbidden => StatusCode::FORBIDDEN,
            BoardError::NotFound => StatusCode::NOT_FOUND,
            BoardError::DuplicateApplication
            | BoardError::IllegalTransition { .. }
            | BoardError::UnsupportedTransition { .. }
            | BoardError::DuplicateEmail => StatusCode::CONFLICT,
            BoardError::CredentialIssue(_) | BoardError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RepositoryError> for BoardError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => BoardError::NotFound,
            other => BoardError::Storage(other),
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            BoardError::Storage(err) => {
                tracing::error!(error = %err, "storage failure while serving request");
            }
            BoardError::CredentialIssue(err) => {
                tracing::error!(error = %err, "credential signing failed");
            }
            _ => {}
        }

        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_stable_status_classes() {
        let cases = [
            (BoardError::validation("x"), StatusCode::BAD_REQUEST),
            (BoardError::Forbidden, StatusCode::FORBIDDEN),
            (BoardError::NotFound, StatusCode::NOT_FOUND),
            (BoardError::DuplicateApplication, StatusCode::CONFLICT),
            (
                BoardError::IllegalTransition {
                    current: ApplicationStatus::Accepted,
                },
                StatusCode::CONFLICT,
            ),
            (
                BoardError::UnsupportedTransition {
                    requested: ApplicationStatus::Pending,
                },
                StatusCode::CONFLICT,
            ),
            (BoardError::DuplicateEmail, StatusCode::CONFLICT),
            (BoardError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                BoardError::InvalidOrExpiredCredential,
                StatusCode::UNAUTHORIZED,
            ),
            (
                BoardError::Storage(RepositoryError::Unavailable("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                BoardError::CredentialIssue(
                    jsonwebtoken::errors::ErrorKind::InvalidKeyFormat.into(),
                ),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
        }
    }

    #[test]
    fn settled_and_unsupported_transitions_read_differently() {
        let settled = BoardError::IllegalTransition {
            current: ApplicationStatus::Accepted,
        };
        let unsupported = BoardError::UnsupportedTransition {
            requested: ApplicationStatus::Pending,
        };
        assert_eq!(settled.kind(), unsupported.kind());
        assert_eq!(
            settled.to_string(),
            "application is already accepted; status can no longer change"
        );
        assert_eq!(
            unsupported.to_string(),
            "an application cannot be moved to pending"
        );
    }

    #[test]
    fn repository_not_found_is_not_a_storage_failure() {
        assert!(matches!(
            BoardError::from(RepositoryError::NotFound),
            BoardError::NotFound
        ));
        assert!(matches!(
            BoardError::from(RepositoryError::Conflict),
            BoardError::Storage(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn forbidden_renders_as_403() {
        let response = BoardError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
