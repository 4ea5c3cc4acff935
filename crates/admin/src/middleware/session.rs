//! Session cookie handling.
//!
//! The session token travels either in the `berkasman_session` cookie
//! (HttpOnly, SameSite=Strict, `Secure` behind HTTPS) or in an
//! `Authorization: Bearer` header for API clients. The header wins when both
//! are present.

use axum::http::{HeaderMap, header};
use chrono::TimeDelta;
use cookie::{Cookie, SameSite};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "berkasman_session";

/// Build the cookie that carries a freshly issued token.
#[must_use]
pub fn session_cookie(token: String, lifetime: TimeDelta, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(lifetime.num_seconds()))
        .build()
}

/// Build a cookie that removes the session cookie from the browser.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}

/// Find the session token in request headers.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_owned())
}
