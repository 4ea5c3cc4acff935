//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::session::TokenError;

/// Errors that can occur while logging in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, missing password, or wrong password. Never more specific.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Credential store failure.
    #[error("credential store error: {0}")]
    Store(#[from] RepositoryError),

    /// Session token could not be issued.
    #[error("session error: {0}")]
    Token(#[from] TokenError),
}
