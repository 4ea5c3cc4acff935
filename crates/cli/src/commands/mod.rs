//! CLI subcommands.

pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Errors shared by commands that need a database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseUrlError {
    /// Neither `BERKASMAN_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("Missing environment variable: BERKASMAN_DATABASE_URL (or DATABASE_URL)")]
    Missing,
}

/// Read the database URL, preferring `BERKASMAN_DATABASE_URL` over `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, DatabaseUrlError> {
    dotenvy::dotenv().ok();

    std::env::var("BERKASMAN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| DatabaseUrlError::Missing)
}
