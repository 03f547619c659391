use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::responses::ErrorResponse;
use crate::auth::AuthError;
use crate::library::LibraryError;
use crate::recipes::RecipeError;

/// Errors that reach the HTTP layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidQuery(_) | AppError::InvalidId(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidQuery(_) => "invalid_query",
            AppError::InvalidId(_) => "invalid_id",
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(_) => tracing::error!("{}", self),
            AppError::Upstream(_) => tracing::warn!("{}", self),
            _ => tracing::debug!("Request rejected ({}): {}", status, self),
        }

        let body = Json(ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<RecipeError> for AppError {
    fn from(e: RecipeError) -> Self {
        match e {
            RecipeError::InvalidQuery => AppError::InvalidQuery(e.to_string()),
            RecipeError::InvalidId(_) => AppError::InvalidId(e.to_string()),
            RecipeError::NotFound(_) => AppError::NotFound(e.to_string()),
            RecipeError::Validation(message) => AppError::Validation(message),
            RecipeError::MissingApiKey
            | RecipeError::Status(_)
            | RecipeError::Transport(_)
            | RecipeError::Decode(_) => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(message) => AppError::Validation(message),
            AuthError::EmailInUse => AppError::Conflict(e.to_string()),
            AuthError::InvalidCredentials | AuthError::Unauthorized => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::UserNotFound => AppError::NotFound(e.to_string()),
            AuthError::Hashing(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<LibraryError> for AppError {
    fn from(e: LibraryError) -> Self {
        match e {
            LibraryError::Validation(message) => AppError::Validation(message),
            LibraryError::NotFound(_) => AppError::NotFound(e.to_string()),
        }
    }
}
