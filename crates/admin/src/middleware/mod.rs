//! HTTP middleware and extractors for admin.
//!
//! - `auth` - the authorization gate and the extractors built on it
//! - `session` - session cookie handling

pub mod auth;
pub mod session;

pub use auth::{
    Denial, GateRejection, MaybeSession, MenuItem, RequireSession, RequireSuperAdmin, authorize,
    menu_for,
};
pub use session::{SESSION_COOKIE_NAME, clear_session_cookie, session_cookie, token_from_headers};
