//! User bootstrap command.
//!
//! The portal only lets a Super Admin create accounts, so the first one has
//! to come from here. Validation, hashing and the duplicate check are the
//! same ones the portal applies.
//!
//! # Environment Variables
//!
//! - `BERKASMAN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BERKASMAN_INITIAL_PASSWORD` - Password for the new user; prompted on stdin when unset

use std::io::BufRead;

use berkasman_admin::db::PgUserStore;
use berkasman_admin::services::{AccountError, AccountService, CreateUserRequest, PasswordHasher};
use thiserror::Error;

use super::{DatabaseUrlError, database_url};

/// Errors that can occur while creating a user.
#[derive(Debug, Error)]
pub enum UserError {
    /// No database URL configured.
    #[error(transparent)]
    Config(#[from] DatabaseUrlError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Could not read the password from stdin.
    #[error("Failed to read password: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected by account validation or storage.
    #[error(transparent)]
    Account(#[from] AccountError),
}

/// Create a user with the given identity and role.
pub async fn create(email: String, name: String, role: String) -> Result<(), UserError> {
    let url = database_url()?;
    let password = initial_password()?;

    tracing::info!("Connecting to database...");
    let pool = berkasman_admin::db::create_pool(&url).await?;
    let store = PgUserStore::new(pool);
    let hasher = PasswordHasher::new();

    let user = AccountService::new(&store, &hasher)
        .register(CreateUserRequest {
            name,
            email,
            password,
            role,
        })
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}

fn initial_password() -> Result<String, std::io::Error> {
    if let Ok(password) = std::env::var("BERKASMAN_INITIAL_PASSWORD") {
        return Ok(password);
    }

    tracing::info!("BERKASMAN_INITIAL_PASSWORD not set, reading password from stdin");
    read_password(std::io::stdin().lock())
}

/// Read a single line, dropping the trailing newline only.
fn read_password(mut input: impl BufRead) -> Result<String, std::io::Error> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_password_strips_line_ending() {
        assert_eq!(read_password(&b"secret123\n"[..]).unwrap(), "secret123");
        assert_eq!(read_password(&b"secret123\r\n"[..]).unwrap(), "secret123");
    }

    #[test]
    fn test_read_password_keeps_inner_spaces() {
        assert_eq!(read_password(&b" pass word \n"[..]).unwrap(), " pass word ");
    }

    #[test]
    fn test_read_password_empty_input() {
        assert_eq!(read_password(&b""[..]).unwrap(), "");
    }
}
