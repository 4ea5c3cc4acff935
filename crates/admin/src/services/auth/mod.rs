//! Authentication service.
//!
//! Verifies an email/password pair against the credential store and issues a
//! signed session. Every failure mode (unknown email, account without a
//! password, wrong password, empty input) produces the same
//! [`AuthError::InvalidCredentials`], and the unknown-email path still runs one
//! hash verification so it takes about as long as a wrong password.

mod error;

pub use error::AuthError;

use std::sync::OnceLock;

use tracing::instrument;

use berkasman_core::{Email, Role};

use crate::db::UserStore;
use crate::services::password::PasswordHasher;
use crate::services::session::{IssuedSession, SessionTokens};

/// Password behind the digest that unknown-email logins verify against.
const DUMMY_PASSWORD: &str = "berkasman-timing-equalizer";

static DUMMY_DIGEST: OnceLock<String> = OnceLock::new();

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn UserStore,
    hasher: &'a PasswordHasher,
    tokens: &'a SessionTokens,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        store: &'a dyn UserStore,
        hasher: &'a PasswordHasher,
        tokens: &'a SessionTokens,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Log in with email and password.
    ///
    /// The email is matched case-insensitively against the stored (lowercase)
    /// address; it is not format-checked.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for any credential problem,
    /// `AuthError::Store` if the lookup fails and `AuthError::Token` if the
    /// session cannot be signed.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthError> {
        let email = Email::normalize_lookup(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.store.find_by_email(&email).await?;

        let digest = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let verified = match digest {
            Some(digest) => self.hasher.verify(password, digest),
            None => {
                let _ = self.hasher.verify(password, self.dummy_digest());
                false
            }
        };

        let Some(user) = user.filter(|_| verified) else {
            tracing::info!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let role = user.role.unwrap_or_else(|| {
            tracing::warn!(user_id = %user.id, "user has no stored role, using {}", Role::LOWEST);
            Role::LOWEST
        });

        let issued = self.tokens.sign(user.id, role)?;
        tracing::info!(user_id = %user.id, role = %role, "login succeeded");
        Ok(issued)
    }

    fn dummy_digest(&self) -> &'static str {
        DUMMY_DIGEST.get_or_init(|| match self.hasher.hash(DUMMY_PASSWORD) {
            Ok(digest) => digest,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "failed to hash dummy digest; unknown-email logins will not be timing-equalized"
                );
                String::new()
            }
        })
    }
}
