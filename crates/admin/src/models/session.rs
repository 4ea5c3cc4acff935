//! Session-related types for authentication.

use chrono::{DateTime, Utc};
use serde::Serialize;

use berkasman_core::{Role, UserId};

/// A verified session: the claims carried by a valid, unexpired token.
///
/// Sessions are never stored server-side; holding one means the token's
/// signature and expiry have already been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// The authenticated user.
    pub user_id: UserId,
    /// Role at the time the session was issued.
    pub role: Role,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

/// The identity exposed to a handler once the authorization gate allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl From<&Session> for CurrentUser {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user_id,
            role: session.role,
        }
    }
}
