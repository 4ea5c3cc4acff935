//! Session tokens.
//!
//! A session is an HS256-signed JWT carrying `{sub, role, iat, exp}`. Nothing
//! is stored server-side: a token is valid exactly when its signature checks
//! out and `exp` is still in the future. Expiry is checked with zero leeway.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use berkasman_core::{Role, UserId};

use crate::models::Session;

/// Errors from signing or verifying a session token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not a well-formed session token.
    #[error("malformed session token")]
    Malformed,

    /// The signature does not match.
    #[error("invalid session token signature")]
    InvalidSignature,

    /// The token has expired.
    #[error("session token expired")]
    Expired,

    /// Signing failed.
    #[error("failed to sign session token")]
    Signing,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::Malformed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// A freshly signed token together with the session it encodes.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: TimeDelta,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("secret", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl SessionTokens {
    /// Create a signer for tokens valid for `lifetime`.
    #[must_use]
    pub fn new(secret: &SecretString, lifetime: TimeDelta) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            lifetime,
        }
    }

    /// How long a newly issued session stays valid.
    #[must_use]
    pub const fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }

    /// Issue a session for `user_id` starting now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn sign(&self, user_id: UserId, role: Role) -> Result<IssuedSession, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a session as if signed at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue_at(
        &self,
        user_id: UserId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedSession, TokenError> {
        // Whole seconds only, so the returned session matches a verified one.
        let issued_at = DateTime::from_timestamp(issued_at.timestamp(), 0).unwrap_or(issued_at);
        let expires_at = issued_at + self.lifetime;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)?;

        Ok(IssuedSession {
            token,
            session: Session {
                user_id,
                role,
                issued_at,
                expires_at,
            },
        })
    }

    /// Verify a token and return the session it carries.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens,
    /// `TokenError::InvalidSignature` for tokens signed with another secret,
    /// and `TokenError::Malformed` for anything else that does not decode.
    pub fn verify(&self, token: &str) -> Result<Session, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Malformed)?;
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)?;

        Ok(Session {
            user_id,
            role: claims.role,
            issued_at,
            expires_at,
        })
    }
}
