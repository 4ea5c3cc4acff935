//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Credential store reachability
//!
//! # Auth
//! POST   /api/auth/login              - Email/password login, sets session cookie
//! POST   /api/auth/logout             - Clears session cookie
//! GET    /api/auth/session            - Current session claims
//!
//! # Account management (Super Admin only)
//! POST   /api/admin/create-user       - Create user
//! GET    /api/admin/get-users         - List users, newest first
//! PUT    /api/admin/user-action?id=N  - Update name and role
//! DELETE /api/admin/user-action?id=N  - Delete user
//!
//! # Pages (JSON page contexts)
//! GET    /                            - Dashboard
//! GET    /login                       - Login page
//! GET    /dokumen                     - Document intake
//! GET    /buku                        - Book production log
//! GET    /super-admin/users           - User management (Super Admin only)
//! GET    /super-admin/create-user     - New user form (Super Admin only)
//! ```
//!
//! API routes answer unsupported methods with 405, an `Allow` header and a
//! JSON error body.

pub mod admin_users;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod pages;

use axum::{
    Router,
    http::Method,
    routing::{MethodRouter, delete, get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    routes().with_state(state)
}

/// All routes, before state is attached.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Auth API
        .route("/api/auth/login", only(post(auth::login), "POST"))
        .route("/api/auth/logout", only(post(auth::logout), "POST"))
        .route("/api/auth/session", only(get(auth::session), "GET"))
        // Account management API
        .route(
            "/api/admin/create-user",
            only(post(admin_users::create_user), "POST"),
        )
        .route(
            "/api/admin/get-users",
            only(get(admin_users::list_users), "GET"),
        )
        .route(
            "/api/admin/user-action",
            only(
                delete(admin_users::delete_user).put(admin_users::update_user),
                "PUT, DELETE",
            ),
        )
        // Pages
        .route("/", get(dashboard::index))
        .route("/login", get(auth::login_page))
        .route("/dokumen", get(pages::dokumen))
        .route("/buku", get(pages::buku))
        .route("/super-admin/users", get(pages::users))
        .route("/super-admin/create-user", get(pages::create_user))
}

/// Answer every method not routed on `router` with a JSON 405.
fn only(router: MethodRouter<AppState>, allow: &'static str) -> MethodRouter<AppState> {
    router.fallback(move |method: Method| async move {
        AppError::MethodNotAllowed { method, allow }
    })
}
