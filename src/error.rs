//! Error taxonomy and its HTTP mapping.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::{ErrorMessage, ValidationErrorResponse};
use crate::validation::FieldErrors;

/// Storage-level failures. None of these are expected in normal operation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The row vanished between the caller's lookup and its write.
    #[error("{entity} {id} no longer exists")]
    Stale { entity: &'static str, id: i64 },

    #[error("{0} has not been saved yet")]
    Unsaved(&'static str),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                return RepositoryError::Constraint(db_err.message().to_string());
            }
        }
        RepositoryError::Database(err)
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// ApiError
///
/// Every failure a handler or the authorization gate can produce. Converted to an
/// HTTP status at the boundary; nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    /// Path identity and body identity disagree.
    #[error("conflict")]
    Conflict,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Repository(RepositoryError::Constraint(_)) => StatusCode::CONFLICT,
            ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => {
                tracing::debug!(%errors, "rejecting invalid payload");
                let body = ValidationErrorResponse {
                    field_errors: errors.into_inner(),
                };
                (status, Json(body)).into_response()
            }
            ApiError::BadRequest(message) => (status, Json(ErrorMessage { message })).into_response(),
            ApiError::Repository(err) => {
                // Log the underlying storage error but return an empty body.
                if status.is_server_error() {
                    tracing::error!(error = %err, "repository failure");
                } else {
                    tracing::warn!(error = %err, "repository rejected write");
                }
                status.into_response()
            }
            ApiError::Forbidden | ApiError::NotFound | ApiError::Conflict => status.into_response(),
        }
    }
}
