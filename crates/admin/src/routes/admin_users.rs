//! Account management API handlers (Super Admin only).
//!
//! Handlers read the session without rejecting, then hand it to
//! [`AccountService`](crate::services::AccountService), which runs the
//! authorization gate before anything else. A malformed query string or JSON
//! body is only reported once the gate has passed.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use berkasman_core::{RoleSet, UserId};

use crate::error::AppError;
use crate::middleware::auth::{MaybeSession, authorize};
use crate::models::{Session, UserProfile};
use crate::services::{CreateUserRequest, UpdateUserRequest};
use crate::state::AppState;

/// Query string for `/api/admin/user-action`.
#[derive(Debug, Default, Deserialize)]
pub struct UserActionQuery {
    pub id: Option<String>,
}

impl UserActionQuery {
    /// The target id. A missing or non-numeric value counts as absent.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.id.as_deref().and_then(|raw| raw.parse().ok())
    }
}

fn body_after_gate<T>(
    session: Option<&Session>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            authorize(session, RoleSet::SUPER_ADMIN)?;
            Err(AppError::Validation(rejection.body_text()))
        }
    }
}

fn query_after_gate(
    session: Option<&Session>,
    query: Result<Query<UserActionQuery>, QueryRejection>,
) -> Result<UserActionQuery, AppError> {
    match query {
        Ok(Query(query)) => Ok(query),
        Err(rejection) => {
            authorize(session, RoleSet::SUPER_ADMIN)?;
            Err(AppError::Validation(rejection.body_text()))
        }
    }
}

/// Create a user.
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = body_after_gate(session.as_ref(), payload)?;
    state.accounts().create(session.as_ref(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User account created" })),
    ))
}

/// List users, newest first.
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let users = state.accounts().list(session.as_ref()).await?;
    Ok(Json(users))
}

/// Update a user's name and role.
#[instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    query: Result<Query<UserActionQuery>, QueryRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let query = query_after_gate(session.as_ref(), query)?;
    let request = body_after_gate(session.as_ref(), payload)?;
    state
        .accounts()
        .update(session.as_ref(), query.user_id(), request)
        .await?;

    Ok(Json(json!({ "message": "User updated" })))
}

/// Delete a user.
#[instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    query: Result<Query<UserActionQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let query = query_after_gate(session.as_ref(), query)?;
    state
        .accounts()
        .delete(session.as_ref(), query.user_id())
        .await?;

    Ok(Json(json!({ "message": "User deleted" })))
}
