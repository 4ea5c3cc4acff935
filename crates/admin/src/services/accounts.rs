//! Account management.
//!
//! Every operation takes the acting session explicitly and passes it through
//! the authorization gate with [`RoleSet::SUPER_ADMIN`] before touching input
//! or storage. Validation reports only the first failing field, checked in the
//! order name, email, password, role.

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use berkasman_core::{Email, Role, RoleSet, UserId};

use crate::db::{RepositoryError, UserStore};
use crate::middleware::auth::{Denial, authorize};
use crate::models::{NewUser, Session, UserPatch, UserProfile};
use crate::services::password::{HashError, PasswordHasher};

/// Minimum display name length, in characters, after trimming.
pub const MIN_NAME_LENGTH: usize = 3;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors from account management operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The acting session is missing or not a Super Admin.
    #[error("access denied: {0}")]
    Denied(#[from] Denial),

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// The email is already registered.
    #[error("Email is already registered")]
    Conflict,

    /// The target id was not supplied.
    #[error("user id is required")]
    MissingId,

    /// The acting user tried to delete themselves.
    #[error("cannot delete own account")]
    SelfDeletion,

    /// Password hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// Credential store failure.
    #[error("credential store error: {0}")]
    Store(RepositoryError),
}

impl From<RepositoryError> for AccountError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::Conflict,
            other => Self::Store(other),
        }
    }
}

/// Input for creating a user. Missing fields deserialize as empty strings so
/// they fail validation with a field-specific message.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Input for updating a user. Only name and role can change; any other
/// fields in the payload are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: String,
    pub role: String,
}

fn validate_name(name: &str) -> Result<String, AccountError> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(AccountError::Validation(format!(
            "Name must be at least {MIN_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

fn validate_email(email: &str) -> Result<Email, AccountError> {
    Email::parse(email)
        .map(Email::normalized)
        .map_err(|_| AccountError::Validation("Invalid email format".to_owned()))
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_role(role: &str) -> Result<Role, AccountError> {
    role.parse()
        .map_err(|_| AccountError::Validation("Please select a valid user role".to_owned()))
}

/// Super Admin account management.
pub struct AccountService<'a> {
    store: &'a dyn UserStore,
    hasher: &'a PasswordHasher,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: &'a dyn UserStore, hasher: &'a PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Denied` unless `session` is a Super Admin,
    /// `AccountError::Validation` for the first invalid field,
    /// `AccountError::Conflict` if the email is already registered (in any
    /// letter case), and `AccountError::Hash`/`Store` for internal failures.
    #[instrument(skip_all, fields(role = %request.role))]
    pub async fn create(
        &self,
        session: Option<&Session>,
        request: CreateUserRequest,
    ) -> Result<UserProfile, AccountError> {
        let actor = authorize(session, RoleSet::SUPER_ADMIN)?;

        let user = self.register(request).await?;
        tracing::info!(actor = %actor.id, user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    /// Create a user without an acting session.
    ///
    /// Applies the same validation, duplicate check and hashing as
    /// [`AccountService::create`]. Only operator tooling (the CLI bootstrap)
    /// calls this directly; HTTP handlers go through `create`.
    ///
    /// # Errors
    ///
    /// Same as [`AccountService::create`], minus `AccountError::Denied`.
    pub async fn register(&self, request: CreateUserRequest) -> Result<UserProfile, AccountError> {
        let name = validate_name(&request.name)?;
        let email = validate_email(&request.email)?;
        validate_password(&request.password)?;
        let role = validate_role(&request.role)?;

        if self.store.find_by_email(email.as_str()).await?.is_some() {
            return Err(AccountError::Conflict);
        }

        let password_hash = self.hasher.hash(&request.password)?;

        // The unique index still guards against a concurrent insert.
        let user = self
            .store
            .insert(NewUser {
                name,
                email,
                password_hash,
                role,
            })
            .await?;

        Ok(user.profile())
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Denied` unless `session` is a Super Admin and
    /// `AccountError::Store` if the store fails.
    pub async fn list(&self, session: Option<&Session>) -> Result<Vec<UserProfile>, AccountError> {
        authorize(session, RoleSet::SUPER_ADMIN)?;

        let users = self.store.list_all_ordered_by_id_desc().await?;
        Ok(users.iter().map(crate::models::StoredUser::profile).collect())
    }

    /// Change a user's name and role.
    ///
    /// Updating an id that does not exist succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Denied` unless `session` is a Super Admin,
    /// `AccountError::MissingId` without an id, `AccountError::Validation`
    /// for an invalid name or role and `AccountError::Store` if the store
    /// fails.
    #[instrument(skip_all, fields(target = ?id))]
    pub async fn update(
        &self,
        session: Option<&Session>,
        id: Option<UserId>,
        request: UpdateUserRequest,
    ) -> Result<(), AccountError> {
        let actor = authorize(session, RoleSet::SUPER_ADMIN)?;
        let id = id.ok_or(AccountError::MissingId)?;

        let patch = UserPatch {
            name: validate_name(&request.name)?,
            role: validate_role(&request.role)?,
        };
        let role = patch.role;

        if self.store.update(id, patch).await? {
            tracing::info!(actor = %actor.id, user_id = %id, role = %role, "user updated");
        } else {
            tracing::warn!(actor = %actor.id, user_id = %id, "update matched no user");
        }
        Ok(())
    }

    /// Permanently delete a user.
    ///
    /// Deleting an id that does not exist succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Denied` unless `session` is a Super Admin,
    /// `AccountError::MissingId` without an id, `AccountError::SelfDeletion`
    /// when `id` is the acting user and `AccountError::Store` if the store
    /// fails.
    #[instrument(skip_all, fields(target = ?id))]
    pub async fn delete(
        &self,
        session: Option<&Session>,
        id: Option<UserId>,
    ) -> Result<(), AccountError> {
        let actor = authorize(session, RoleSet::SUPER_ADMIN)?;
        let id = id.ok_or(AccountError::MissingId)?;

        if id == actor.id {
            return Err(AccountError::SelfDeletion);
        }

        if self.store.delete(id).await? {
            tracing::info!(actor = %actor.id, user_id = %id, "user deleted");
        } else {
            tracing::warn!(actor = %actor.id, user_id = %id, "delete matched no user");
        }
        Ok(())
    }
}
