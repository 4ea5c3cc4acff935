//! Password hashing.
//!
//! Digests are Argon2id PHC strings with a random per-password salt. Cost
//! parameters are fixed at 19 MiB memory, 2 iterations and 1 lane, so every
//! digest this service produces verifies in roughly the same time.

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

/// Hashing failed inside argon2 (e.g. a password exceeding its input limits).
#[derive(Debug, Error)]
#[error("failed to hash password")]
pub struct HashError;

/// One-way password hashing with constant-time verification.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &Algorithm::Argon2id)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Create a hasher with the portal's fixed cost parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT),
        }
    }

    /// Hash a plaintext password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if argon2 rejects the input.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| HashError)
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// A malformed digest never matches.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new();
        let digest = hasher.hash("rahasia123").unwrap();

        assert!(digest.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(hasher.verify("rahasia123", &digest));
        assert!(!hasher.verify("rahasia124", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash("rahasia123").unwrap();
        let b = hasher.hash("rahasia123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_digest_never_verifies() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("rahasia123", ""));
        assert!(!hasher.verify("rahasia123", "rahasia123"));
        assert!(!hasher.verify("rahasia123", "$2b$10$abcdefghijklmnopqrstuv"));
    }
}
