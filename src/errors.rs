use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

use crate::store::StoreError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or credentials invalid
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated but the resolved role is not in the route's allowed set
    #[error("Forbidden: access denied")]
    Forbidden,

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Conflict, e.g. for unique constraint violations
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Persistence layer failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Store(store_err) => match store_err {
                StoreError::UniqueViolation { .. } => StatusCode::CONFLICT,
                // An out-of-set role name is a data-integrity anomaly; it is
                // handled as forbidden where it matters (role authorizer) and
                // only reaches here from non-auth paths.
                StoreError::UnknownRole(_) => StatusCode::INTERNAL_SERVER_ERROR,
                StoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "User not authorized".to_string()),
            Error::Forbidden => "Forbidden: access denied".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource } => format!("{resource} not found"),
            Error::Conflict { message } => message.clone(),
            Error::Store(store_err) => match store_err {
                StoreError::UniqueViolation { field } if field.contains("email") => {
                    "An account with this email address already exists".to_string()
                }
                StoreError::UniqueViolation { .. } => "Resource already exists".to_string(),
                StoreError::UnknownRole(_) | StoreError::Other(_) => "Internal server error".to_string(),
            },
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Store(StoreError::Other(_)) | Error::Store(StoreError::UnknownRole(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Store(_) | Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = json!({ "message": self.user_message() });
        (status, axum::response::Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
