//! Integration tests for the Berkasman admin portal.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the memory store
//! cargo test -p berkasman-integration-tests
//!
//! # Include the PostgreSQL store tests
//! BERKASMAN_TEST_DATABASE_URL=postgres://localhost/berkasman_test \
//!     cargo test -p berkasman-integration-tests -- --include-ignored
//! ```
//!
//! [`TestApp`] wires the real router to a [`MemoryUserStore`] and drives it
//! with `tower::ServiceExt::oneshot`, so no server or database is needed.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use berkasman_admin::AppState;
use berkasman_admin::db::MemoryUserStore;
use berkasman_admin::models::StoredUser;
use berkasman_admin::routes;
use berkasman_admin::services::{PasswordHasher, SessionTokens};
use berkasman_core::{Email, Role, UserId};

/// Signing secret used by every test app.
pub const TEST_SECRET: &str = "integration-test-signing-secret-with-enough-entropy-0123456789";

/// A response, already read to the end.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The `error` field of a JSON error body.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// The application under test.
pub struct TestApp {
    pub store: Arc<MemoryUserStore>,
    pub tokens: SessionTokens,
    router: Router,
}

impl TestApp {
    /// A fresh app with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let tokens = test_tokens();
        let state = AppState::new(store.clone(), test_tokens(), false);
        Self {
            store,
            tokens,
            router: routes::router(state),
        }
    }

    /// Seed a user with a known password and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the id or email is already seeded.
    pub async fn seed_user(&self, id: i32, name: &str, email: &str, password: &str, role: Role) -> UserId {
        let hash = PasswordHasher::new()
            .hash(password)
            .unwrap_or_else(|e| panic!("hash failed: {e}"));
        self.seed_raw(StoredUser {
            id: UserId::new(id),
            name: name.to_owned(),
            email: parse_email(email),
            password_hash: Some(hash),
            role: Some(role),
            created_at: Utc::now(),
        })
        .await
    }

    /// Seed a record verbatim, e.g. a legacy row without a role or password.
    ///
    /// # Panics
    ///
    /// Panics if the id or email is already seeded.
    pub async fn seed_raw(&self, user: StoredUser) -> UserId {
        let id = user.id;
        self.store
            .seed(user)
            .await
            .unwrap_or_else(|e| panic!("seed failed: {e}"));
        id
    }

    /// A valid session token for `id` acting as `role`.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    pub fn token_for(&self, id: UserId, role: Role) -> String {
        self.tokens
            .sign(id, role)
            .unwrap_or_else(|e| panic!("sign failed: {e}"))
            .token
    }

    /// Send a request with an optional bearer token and JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .unwrap_or_else(|e| panic!("bad request: {e}"));
        self.send_request(request).await
    }

    /// Send a prebuilt request.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read.
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("body read failed: {e}"));
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Session tokens signed with [`TEST_SECRET`] and a one-day lifetime.
#[must_use]
pub fn test_tokens() -> SessionTokens {
    SessionTokens::new(&SecretString::from(TEST_SECRET.to_owned()), TimeDelta::days(1))
}

/// Parse and normalize an email fixture.
///
/// # Panics
///
/// Panics on an invalid address.
#[must_use]
pub fn parse_email(raw: &str) -> Email {
    Email::parse(raw)
        .unwrap_or_else(|e| panic!("bad fixture email {raw}: {e}"))
        .normalized()
}
