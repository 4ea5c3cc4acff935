//! Super Admin account management API through the full router.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use berkasman_admin::AppState;
use berkasman_admin::db::{RepositoryError, UserStore};
use berkasman_admin::models::{NewUser, StoredUser, UserPatch};
use berkasman_admin::routes;
use berkasman_core::{Role, UserId};
use berkasman_integration_tests::{TestApp, test_tokens};

const ADMIN_ID: i32 = 7;

/// An app with a Super Admin (id 7) and their token.
async fn admin_app() -> (TestApp, String) {
    let app = TestApp::new();
    let id = app
        .seed_user(ADMIN_ID, "Super Admin", "admin@x.com", "admin-pass", Role::SuperAdmin)
        .await;
    let token = app.token_for(id, Role::SuperAdmin);
    (app, token)
}

fn budi() -> Value {
    json!({
        "name": "Budi Santoso",
        "email": "budi@x.com",
        "password": "rahasia123",
        "role": "Admin Buku",
    })
}

#[tokio::test]
async fn test_create_then_duplicate_conflicts() {
    let (app, token) = admin_app().await;

    let first = app
        .send(Method::POST, "/api/admin/create-user", Some(&token), Some(&budi()))
        .await;
    let second = app
        .send(Method::POST, "/api/admin/create-user", Some(&token), Some(&budi()))
        .await;

    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body, json!({ "message": "User account created" }));
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.error(), Some("Email is already registered"));
    assert_eq!(app.store.len().await, 2);
}

#[tokio::test]
async fn test_email_uniqueness_ignores_case() {
    let (app, token) = admin_app().await;
    let mut upper = budi();
    upper["email"] = json!("A@B.com");
    let mut lower = budi();
    lower["email"] = json!("a@b.com");

    let first = app
        .send(Method::POST, "/api/admin/create-user", Some(&token), Some(&upper))
        .await;
    let second = app
        .send(Method::POST, "/api/admin/create-user", Some(&token), Some(&lower))
        .await;

    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.error(), Some("Email is already registered"));
}

#[tokio::test]
async fn test_created_user_can_log_in_with_normalized_email() {
    let (app, token) = admin_app().await;
    let mut body = budi();
    body["email"] = json!("Budi@X.com");
    app.send(Method::POST, "/api/admin/create-user", Some(&token), Some(&body))
        .await;

    let login = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(&json!({ "email": "budi@x.com", "password": "rahasia123" })),
        )
        .await;

    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["user"]["role"], json!("Admin Buku"));
    let stored = app.store.find_by_email("budi@x.com").await.unwrap().unwrap();
    assert_eq!(stored.email.as_str(), "budi@x.com");
}

#[tokio::test]
async fn test_create_reports_first_invalid_field() {
    let (app, token) = admin_app().await;
    let cases = [
        (
            json!({ "name": "Bu", "email": "bad", "password": "1", "role": "x" }),
            "Name must be at least 3 characters",
        ),
        (
            json!({ "name": "Budi", "email": "bad", "password": "1", "role": "x" }),
            "Invalid email format",
        ),
        (
            json!({ "name": "Budi", "email": "budi@x.com", "password": "12345", "role": "x" }),
            "Password must be at least 6 characters",
        ),
        (
            json!({ "name": "Budi", "email": "budi@x.com", "password": "123456", "role": "Admin" }),
            "Please select a valid user role",
        ),
        (json!({}), "Name must be at least 3 characters"),
    ];

    for (body, message) in cases {
        let resp = app
            .send(Method::POST, "/api/admin/create-user", Some(&token), Some(&body))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(resp.error(), Some(message), "{body}");
    }
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_create_requires_super_admin() {
    let (app, _) = admin_app().await;
    let reviewer = app.token_for(UserId::new(2), Role::Reviewer);

    let anonymous = app
        .send(Method::POST, "/api/admin/create-user", None, Some(&budi()))
        .await;
    let forbidden = app
        .send(Method::POST, "/api/admin/create-user", Some(&reviewer), Some(&budi()))
        .await;

    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_malformed_body_is_gated_before_validation() {
    let (app, token) = admin_app().await;
    let malformed = |token: Option<&str>| {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/admin/create-user")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from("{\"name\":")).unwrap()
    };

    let anonymous = app.send_request(malformed(None)).await;
    let admin = app.send_request(malformed(Some(&token))).await;

    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(admin.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_is_newest_first_without_password() {
    let (app, token) = admin_app().await;
    app.seed_user(2, "Ani Reviewer", "ani@x.com", "ani-pass", Role::Reviewer)
        .await;
    app.send(Method::POST, "/api/admin/create-user", Some(&token), Some(&budi()))
        .await;

    let resp = app
        .send(Method::GET, "/api/admin/get-users", Some(&token), None)
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let users = resp.body.as_array().unwrap();
    let ids: Vec<i64> = users.iter().map(|u| u["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![8, 7, 2]);
    for user in users {
        let fields = user.as_object().unwrap();
        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["email", "id", "name", "role"]);
    }
    assert!(!resp.body.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_reviewer_listing_users_is_forbidden() {
    let (app, _) = admin_app().await;
    let id = app
        .seed_user(2, "Ani Reviewer", "ani@x.com", "ani-pass", Role::Reviewer)
        .await;
    let token = app.token_for(id, Role::Reviewer);

    let forbidden = app
        .send(Method::GET, "/api/admin/get-users", Some(&token), None)
        .await;
    let anonymous = app.send(Method::GET, "/api/admin/get-users", None, None).await;

    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(
        forbidden.error(),
        Some("You do not have permission to perform this action")
    );
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_every_non_super_admin_role_is_forbidden() {
    let (app, _) = admin_app().await;

    for role in [Role::AdminDokumen, Role::AdminBuku, Role::Reviewer] {
        let token = app.token_for(UserId::new(ADMIN_ID), role);
        for (method, uri) in [
            (Method::GET, "/api/admin/get-users"),
            (Method::DELETE, "/api/admin/user-action?id=7"),
            (Method::PUT, "/api/admin/user-action?id=7"),
        ] {
            let body = json!({ "name": "Nama Baru", "role": "Reviewer" });
            let resp = app.send(method, uri, Some(&token), Some(&body)).await;
            assert_eq!(resp.status, StatusCode::FORBIDDEN, "{role} {uri}");
        }
    }
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_update_changes_only_name_and_role() {
    let (app, token) = admin_app().await;
    let id = app
        .seed_user(2, "Ani Reviewer", "ani@x.com", "ani-pass", Role::Reviewer)
        .await;
    let before = app.store.find_by_email("ani@x.com").await.unwrap().unwrap();

    let resp = app
        .send(
            Method::PUT,
            &format!("/api/admin/user-action?id={id}"),
            Some(&token),
            Some(&json!({
                "name": "Ani Dokumen",
                "role": "Admin Dokumen",
                "email": "hijack@x.com",
                "password": "new-password",
            })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "message": "User updated" }));
    assert!(app.store.find_by_email("hijack@x.com").await.unwrap().is_none());
    let after = app.store.find_by_email("ani@x.com").await.unwrap().unwrap();
    assert_eq!(after.name, "Ani Dokumen");
    assert_eq!(after.role, Some(Role::AdminDokumen));
    assert_eq!(after.password_hash, before.password_hash);
}

#[tokio::test]
async fn test_update_validates_name_and_role() {
    let (app, token) = admin_app().await;

    let short_name = app
        .send(
            Method::PUT,
            "/api/admin/user-action?id=7",
            Some(&token),
            Some(&json!({ "name": "Al", "role": "Reviewer" })),
        )
        .await;
    let bad_role = app
        .send(
            Method::PUT,
            "/api/admin/user-action?id=7",
            Some(&token),
            Some(&json!({ "name": "Alya", "role": "Owner" })),
        )
        .await;

    assert_eq!(short_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_name.error(), Some("Name must be at least 3 characters"));
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_role.error(), Some("Please select a valid user role"));
}

#[tokio::test]
async fn test_user_action_requires_id() {
    let (app, token) = admin_app().await;
    let body = json!({ "name": "Nama Baru", "role": "Reviewer" });

    for uri in ["/api/admin/user-action", "/api/admin/user-action?id=abc"] {
        let update = app.send(Method::PUT, uri, Some(&token), Some(&body)).await;
        let delete = app.send(Method::DELETE, uri, Some(&token), None).await;
        assert_eq!(update.status, StatusCode::BAD_REQUEST);
        assert_eq!(update.error(), Some("User ID is required"));
        assert_eq!(delete.status, StatusCode::BAD_REQUEST);
        assert_eq!(delete.error(), Some("User ID is required"));
    }
}

#[tokio::test]
async fn test_super_admin_cannot_delete_self() {
    let (app, token) = admin_app().await;

    let resp = app
        .send(Method::DELETE, "/api/admin/user-action?id=7", Some(&token), None)
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), Some("You cannot delete your own account"));
    assert!(app.store.find_by_email("admin@x.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_removes_user() {
    let (app, token) = admin_app().await;
    app.seed_user(2, "Ani Reviewer", "ani@x.com", "ani-pass", Role::Reviewer)
        .await;

    let resp = app
        .send(Method::DELETE, "/api/admin/user-action?id=2", Some(&token), None)
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "message": "User deleted" }));
    assert!(app.store.find_by_email("ani@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_id_is_not_an_error() {
    let (app, token) = admin_app().await;

    let update = app
        .send(
            Method::PUT,
            "/api/admin/user-action?id=999",
            Some(&token),
            Some(&json!({ "name": "Siapa Saja", "role": "Reviewer" })),
        )
        .await;
    let delete = app
        .send(Method::DELETE, "/api/admin/user-action?id=999", Some(&token), None)
        .await;

    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(delete.status, StatusCode::OK);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_wrong_methods_get_405_with_allow() {
    let (app, token) = admin_app().await;
    let cases = [
        (Method::GET, "/api/admin/create-user", "POST"),
        (Method::DELETE, "/api/admin/create-user", "POST"),
        (Method::POST, "/api/admin/get-users", "GET"),
        (Method::POST, "/api/admin/user-action?id=2", "PUT, DELETE"),
        (Method::GET, "/api/admin/user-action?id=2", "PUT, DELETE"),
    ];

    for (method, uri, allow) in cases {
        let resp = app.send(method.clone(), uri, Some(&token), None).await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(resp.headers.get(header::ALLOW).unwrap(), allow);
        assert!(resp.error().is_some());
    }
}

/// A store that loses every insert race: the pre-check finds nothing, the
/// unique index rejects the row.
struct LosingRaceStore;

#[async_trait::async_trait]
impl UserStore for LosingRaceStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<StoredUser>, RepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _user: NewUser) -> Result<StoredUser, RepositoryError> {
        Err(RepositoryError::Conflict("users_email_lower_key".to_owned()))
    }

    async fn update(&self, _id: UserId, _patch: UserPatch) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _id: UserId) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    async fn list_all_ordered_by_id_desc(&self) -> Result<Vec<StoredUser>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unique_index_conflict_is_400() {
    let state = AppState::new(Arc::new(LosingRaceStore), test_tokens(), false);
    let token = test_tokens()
        .sign(UserId::new(ADMIN_ID), Role::SuperAdmin)
        .unwrap()
        .token;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/create-user")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(budi().to_string()))
        .unwrap();

    let response = routes::router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Email is already registered" }));
}

#[tokio::test]
async fn test_malformed_query_is_gated_before_validation() {
    let (app, token) = admin_app().await;
    let reviewer = app.token_for(UserId::new(2), Role::Reviewer);
    let uri = "/api/admin/user-action?id=1&id=2";
    let body = json!({ "name": "Nama Baru", "role": "Reviewer" });

    for method in [Method::PUT, Method::DELETE] {
        let anonymous = app.send(method.clone(), uri, None, Some(&body)).await;
        let forbidden = app
            .send(method.clone(), uri, Some(&reviewer), Some(&body))
            .await;
        let admin = app.send(method.clone(), uri, Some(&token), Some(&body)).await;

        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED, "{method}");
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN, "{method}");
        assert_eq!(admin.status, StatusCode::BAD_REQUEST, "{method}");
        assert!(admin.error().is_some(), "{method}");
    }
    assert_eq!(app.store.len().await, 1);
}
