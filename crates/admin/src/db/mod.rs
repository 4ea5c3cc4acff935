//! Credential store for the admin portal.
//!
//! # Tables
//!
//! - `app.users` - user accounts with hashed passwords and roles
//!
//! Email uniqueness is enforced by a unique index on `lower(email)`. The
//! service layer pre-checks duplicates for a friendly error, but the index is
//! the source of truth: a concurrent insert that slips past the pre-check
//! surfaces as [`RepositoryError::Conflict`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p berkasman-cli -- migrate
//! ```

pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use berkasman_core::UserId;

use crate::models::{NewUser, StoredUser, UserPatch};

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Durable record of users and their hashed passwords.
///
/// Implementations must enforce case-insensitive email uniqueness themselves;
/// callers rely on [`RepositoryError::Conflict`] when a pre-check races.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by normalized (lowercase) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, RepositoryError>;

    /// Insert a new user and return the stored record.
    async fn insert(&self, user: NewUser) -> Result<StoredUser, RepositoryError>;

    /// Update name and role. Returns whether a row was affected.
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<bool, RepositoryError>;

    /// Permanently delete a user. Returns whether a row was affected.
    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;

    /// All users, newest id first.
    async fn list_all_ordered_by_id_desc(&self) -> Result<Vec<StoredUser>, RepositoryError>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
