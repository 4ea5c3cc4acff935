//! Authorization gate and authentication extractors.
//!
//! [`authorize`] is the single decision point: given the request's session (if
//! any) and a route's [`RoleSet`], it either yields the [`CurrentUser`] or a
//! [`Denial`]. Extractors here only read and verify the token, then hand the
//! resulting `Option<Session>` to the gate. How a denial is presented depends
//! on the route kind:
//!
//! | Denial | Page | API (`/api/...`) |
//! |---|---|---|
//! | `Unauthenticated` | redirect to `/login` | 401 JSON |
//! | `Forbidden` | redirect to `/` | 403 JSON |

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use thiserror::Error;

use berkasman_core::{Role, RoleSet};

use super::session::token_from_headers;
use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, Session};
use crate::state::AppState;

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    /// No valid session.
    #[error("authentication required")]
    Unauthenticated,
    /// Valid session, but its role is not permitted.
    #[error("role not permitted")]
    Forbidden,
}

/// Decide whether `session` may access a route requiring `required`.
///
/// # Errors
///
/// Returns `Denial::Unauthenticated` when there is no session and
/// `Denial::Forbidden` when the session's role is not in `required`.
pub fn authorize(session: Option<&Session>, required: RoleSet) -> Result<CurrentUser, Denial> {
    let session = session.ok_or(Denial::Unauthenticated)?;

    if !required.permits(session.role) {
        return Err(Denial::Forbidden);
    }

    Ok(CurrentUser::from(session))
}

/// The request's verified session, if it carries one.
///
/// Never rejects: a missing, malformed, forged or expired token all yield
/// `None`.
pub struct MaybeSession(pub Option<Session>);

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            return Ok(Self(None));
        };

        match state.tokens().verify(&token) {
            Ok(session) => {
                set_sentry_user(session.user_id.as_i32());
                Ok(Self(Some(session)))
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring invalid session token");
                Ok(Self(None))
            }
        }
    }
}

/// Rejection produced by the gate extractors.
#[derive(Debug)]
pub struct GateRejection {
    denial: Denial,
    api: bool,
}

impl GateRejection {
    fn new(denial: Denial, path: &str) -> Self {
        Self {
            denial,
            api: path.starts_with("/api/"),
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match (self.api, self.denial) {
            (true, denial) => AppError::from(denial).into_response(),
            (false, Denial::Unauthenticated) => Redirect::to("/login").into_response(),
            (false, Denial::Forbidden) => Redirect::to("/").into_response(),
        }
    }
}

async fn gate(
    parts: &mut Parts,
    state: &AppState,
    required: RoleSet,
) -> Result<CurrentUser, GateRejection> {
    let MaybeSession(session) = match MaybeSession::from_request_parts(parts, state).await {
        Ok(session) => session,
        Err(never) => match never {},
    };

    authorize(session.as_ref(), required).map_err(|denial| {
        tracing::debug!(path = %parts.uri.path(), ?denial, "request denied");
        GateRejection::new(denial, parts.uri.path())
    })
}

/// Extractor that requires any authenticated session.
pub struct RequireSession(pub CurrentUser);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, RoleSet::ANY).await.map(Self)
    }
}

/// Extractor that requires a Super Admin session.
pub struct RequireSuperAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, RoleSet::SUPER_ADMIN).await.map(Self)
    }
}

/// A navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: &'static str,
    pub href: &'static str,
}

const MENU: [(MenuItem, RoleSet); 4] = [
    (
        MenuItem {
            title: "Dashboard",
            href: "/",
        },
        RoleSet::ANY,
    ),
    (
        MenuItem {
            title: "Manajemen User",
            href: "/super-admin/users",
        },
        RoleSet::SUPER_ADMIN,
    ),
    (
        MenuItem {
            title: "Dokumen",
            href: "/dokumen",
        },
        RoleSet::ANY,
    ),
    (
        MenuItem {
            title: "Buku",
            href: "/buku",
        },
        RoleSet::ANY,
    ),
];

/// Navigation entries visible to `role`.
#[must_use]
pub fn menu_for(role: Role) -> Vec<MenuItem> {
    MENU.iter()
        .filter(|(_, required)| required.permits(role))
        .map(|(item, _)| *item)
        .collect()
}
