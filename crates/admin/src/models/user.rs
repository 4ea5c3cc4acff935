//! User domain types.
//!
//! [`StoredUser`] is the full credential-store record and is only handed to
//! the authentication path. Everything that leaves the process goes through
//! [`UserProfile`], which has no password field at all.

use chrono::{DateTime, Utc};
use serde::Serialize;

use berkasman_core::{Email, Role, UserId};

/// A user record as held by the credential store.
#[derive(Clone)]
pub struct StoredUser {
    /// Unique user ID, assigned by the store.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized (lowercase) login email.
    pub email: Email,
    /// PHC-formatted password hash. `None` for accounts without a password.
    pub password_hash: Option<String>,
    /// Stored role. `None` only for malformed legacy rows.
    pub role: Option<Role>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// The role used for authorization, falling back to the lowest privilege.
    #[must_use]
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::LOWEST)
    }

    /// The public read model of this user.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.effective_role(),
        }
    }
}

impl std::fmt::Debug for StoredUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A user as returned by list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Input for inserting a new user. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// The mutable subset of a user. Email and password are not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stored(role: Option<Role>) -> StoredUser {
        StoredUser {
            id: UserId::new(3),
            name: "Sari Dewi".to_owned(),
            email: Email::parse("sari@x.com").unwrap(),
            password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned()),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_role_falls_back_to_reviewer() {
        assert_eq!(stored(None).effective_role(), Role::Reviewer);
        assert_eq!(stored(Some(Role::AdminBuku)).effective_role(), Role::AdminBuku);
    }

    #[test]
    fn test_profile_serializes_without_password() {
        let json = serde_json::to_value(stored(Some(Role::AdminDokumen)).profile()).unwrap();
        let obj = json.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["email", "id", "name", "role"]);
        assert_eq!(obj["role"], "Admin Dokumen");
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let debug = format!("{:?}", stored(None));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("argon2id"));
    }
}
