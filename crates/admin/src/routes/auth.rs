//! Authentication route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use berkasman_core::RoleSet;

use crate::error::AppError;
use crate::middleware::auth::{MaybeSession, authorize};
use crate::middleware::session::{clear_session_cookie, session_cookie};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Login form body.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: CurrentUser,
}

/// Session claims as reported to clients.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub user: CurrentUser,
    pub expires_at: DateTime<Utc>,
}

/// Log in with email and password.
///
/// A malformed body is treated like bad credentials.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Ok(Json(request)) = payload else {
        return Err(AppError::InvalidCredentials);
    };

    let issued = state
        .auth()
        .authenticate(&request.email, &request.password)
        .await?;

    let cookie = session_cookie(
        issued.token.clone(),
        state.tokens().lifetime(),
        state.secure_cookies(),
    );
    let body = LoginResponse {
        token: issued.token,
        expires_at: issued.session.expires_at,
        user: CurrentUser::from(&issued.session),
    };

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie.to_string())]),
        Json(body),
    )
        .into_response())
}

/// Log out by clearing the session cookie.
///
/// Tokens are stateless, so a copied token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(state.secure_cookies());
    (
        AppendHeaders([(header::SET_COOKIE, cookie.to_string())]),
        Json(json!({ "message": "Signed out" })),
    )
}

/// Report the current session.
pub async fn session(
    MaybeSession(session): MaybeSession,
) -> Result<Json<SessionResponse>, AppError> {
    let user = authorize(session.as_ref(), RoleSet::ANY)?;

    Ok(Json(SessionResponse {
        user,
        expires_at: session.map(|s| s.expires_at).unwrap_or_default(),
    }))
}

/// Login page. Already signed-in users go straight to the dashboard.
pub async fn login_page(MaybeSession(session): MaybeSession) -> Response {
    if session.is_some() {
        return Redirect::to("/").into_response();
    }

    Json(json!({
        "page": "login",
        "title": "Berkasman Management",
        "action": "/api/auth/login",
    }))
    .into_response()
}
