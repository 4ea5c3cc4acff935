//! Unified error handling for admin.
//!
//! Every failure that reaches an HTTP client goes through [`AppError`], which
//! renders `{"error": "<message>"}` with the matching status. Server-side
//! failures are reported to Sentry and logged; their details never leave the
//! process.

use axum::{
    Json,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::middleware::auth::Denial;
use crate::services::accounts::AccountError;
use crate::services::auth::AuthError;

/// Application-level error type for the admin portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid session.
    #[error("Authentication required")]
    Unauthenticated,

    /// Login failed. Deliberately says nothing about which part was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Session role does not satisfy the route.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Input failed validation. Carries the first failing field's message.
    #[error("{0}")]
    Validation(String),

    /// Email already registered.
    #[error("{0}")]
    Conflict(String),

    /// A user tried to delete their own account.
    #[error("You cannot delete your own account")]
    SelfDeletionForbidden,

    /// The `id` query parameter is missing or not a number.
    #[error("User ID is required")]
    MissingId,

    /// Route exists but not for this method.
    #[error("Method {method} not allowed")]
    MethodNotAllowed {
        method: Method,
        /// Comma-separated list for the `Allow` header.
        allow: &'static str,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::SelfDeletionForbidden
            | Self::MissingId => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();

        if let Self::MethodNotAllowed { allow, .. } = &self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }

        response
    }
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthenticated,
            Denial::Forbidden => Self::Forbidden,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Store(e) => Self::Database(e),
            AuthError::Token(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Denied(denial) => denial.into(),
            AccountError::Validation(message) => Self::Validation(message),
            AccountError::Conflict => Self::Conflict(AccountError::Conflict.to_string()),
            AccountError::MissingId => Self::MissingId,
            AccountError::SelfDeletion => Self::SelfDeletionForbidden,
            AccountError::Hash(e) => Self::Internal(e.to_string()),
            AccountError::Store(e) => Self::Database(e),
        }
    }
}

/// Set the Sentry user context from a session's user ID.
pub fn set_sentry_user(user_id: i32) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
