//! `PgUserStore` against a real database.
//!
//! These tests require a migrated `PostgreSQL` database named by
//! `BERKASMAN_TEST_DATABASE_URL`. Run with `--include-ignored`.

#![allow(clippy::unwrap_used)]

use berkasman_admin::db::{PgUserStore, RepositoryError, UserStore, create_pool};
use berkasman_admin::models::{NewUser, UserPatch};
use berkasman_core::Role;
use berkasman_integration_tests::parse_email;
use secrecy::SecretString;

async fn store() -> PgUserStore {
    let url = std::env::var("BERKASMAN_TEST_DATABASE_URL")
        .expect("BERKASMAN_TEST_DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url)).await.unwrap();
    sqlx::migrate!("../admin/migrations").run(&pool).await.unwrap();
    PgUserStore::new(pool)
}

/// An address no other run has used, so tests can share one database.
fn unique_email(local: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap();
    format!("{local}-{nanos}@x.com")
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Budi Santoso".to_owned(),
        email: parse_email(email),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_owned(),
        role: Role::AdminBuku,
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (BERKASMAN_TEST_DATABASE_URL)"]
async fn test_pg_store_lifecycle() {
    let store = store().await;
    store.ping().await.unwrap();

    let budi = unique_email("budi");
    let first = store.insert(new_user(&budi)).await.unwrap();
    let second = store.insert(new_user(&unique_email("ani"))).await.unwrap();

    let found = store
        .find_by_email(&budi.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);

    let listed: Vec<_> = store
        .list_all_ordered_by_id_desc()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .filter(|id| *id == first.id || *id == second.id)
        .collect();
    assert_eq!(listed, vec![second.id, first.id]);

    let patch = UserPatch {
        name: "Budi S.".to_owned(),
        role: Role::Reviewer,
    };
    assert!(store.update(first.id, patch).await.unwrap());
    let updated = store.find_by_email(&budi).await.unwrap().unwrap();
    assert_eq!(updated.role, Some(Role::Reviewer));
    assert_eq!(updated.password_hash, first.password_hash);

    assert!(store.delete(second.id).await.unwrap());
    assert!(!store.delete(second.id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (BERKASMAN_TEST_DATABASE_URL)"]
async fn test_pg_store_unique_email_ignores_case() {
    let store = store().await;

    let email = unique_email("a");
    store.insert(new_user(&email)).await.unwrap();
    let mut duplicate = new_user(&email);
    // Bypass normalization to exercise the unique index itself.
    duplicate.email = berkasman_core::Email::parse(&email.to_uppercase()).unwrap();

    let err = store.insert(duplicate).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}
