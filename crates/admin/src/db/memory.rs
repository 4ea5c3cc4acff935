//! In-process [`UserStore`] used by tests and `BERKASMAN_STORE=memory`.
//!
//! All state sits behind one lock, so the duplicate-email check and the insert
//! are atomic just like the unique index in `PostgreSQL`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use berkasman_core::UserId;

use super::{RepositoryError, UserStore};
use crate::models::{NewUser, StoredUser, UserPatch};

#[derive(Default)]
struct Inner {
    next_id: i32,
    users: BTreeMap<UserId, StoredUser>,
}

/// Volatile user store. Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    /// Create an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record verbatim, keeping its id.
    ///
    /// Used to seed fixtures such as legacy rows without a role or password.
    /// Later inserts continue numbering after the highest seeded id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id or email is already taken.
    pub async fn seed(&self, user: StoredUser) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(format!("id {} already exists", user.id)));
        }
        if email_taken(&inner, user.email.as_str()) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        inner.next_id = inner.next_id.max(user.id.as_i32());
        inner.users.insert(user.id, user);
        Ok(())
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.users.is_empty()
    }
}

fn email_taken(inner: &Inner, email: &str) -> bool {
    inner
        .users
        .values()
        .any(|u| u.email.as_str().eq_ignore_ascii_case(email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<StoredUser, RepositoryError> {
        let mut inner = self.inner.write().await;
        if email_taken(&inner, user.email.as_str()) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        let stored = StoredUser {
            id: UserId::new(inner.next_id),
            name: user.name,
            email: user.email,
            password_hash: Some(user.password_hash),
            role: Some(user.role),
            created_at: Utc::now(),
        };
        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(false);
        };
        user.name = patch.name;
        user.role = Some(patch.role);
        Ok(true)
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    async fn list_all_ordered_by_id_desc(&self) -> Result<Vec<StoredUser>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().rev().cloned().collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use berkasman_core::{Email, Role};

    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_owned(),
            email: Email::parse(email).unwrap().normalized(),
            password_hash: "hash".to_owned(),
            role: Role::AdminDokumen,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryUserStore::new();
        let a = store.insert(new_user("Alpha", "a@x.com")).await.unwrap();
        let b = store.insert(new_user("Bravo", "b@x.com")).await.unwrap();
        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_case_insensitive_duplicate() {
        let store = MemoryUserStore::new();
        store.insert(new_user("Alpha", "a@b.com")).await.unwrap();

        let mut dup = new_user("Other", "a@b.com");
        dup.email = Email::parse("A@B.com").unwrap();
        let err = store.insert(dup).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_email_ignores_case() {
        let store = MemoryUserStore::new();
        store.insert(new_user("Alpha", "a@b.com")).await.unwrap();
        assert!(store.find_by_email("A@B.COM").await.unwrap().is_some());
        assert!(store.find_by_email("c@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_changes_only_name_and_role() {
        let store = MemoryUserStore::new();
        let user = store.insert(new_user("Alpha", "a@b.com")).await.unwrap();

        let patch = UserPatch {
            name: "Alpha Prime".to_owned(),
            role: Role::AdminBuku,
        };
        assert!(store.update(user.id, patch).await.unwrap());

        let after = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(after.name, "Alpha Prime");
        assert_eq!(after.role, Some(Role::AdminBuku));
        assert_eq!(after.email, user.email);
        assert_eq!(after.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let store = MemoryUserStore::new();
        let patch = UserPatch {
            name: "Nobody".to_owned(),
            role: Role::Reviewer,
        };
        assert!(!store.update(UserId::new(99), patch).await.unwrap());
        assert!(!store.delete(UserId::new(99)).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id_desc() {
        let store = MemoryUserStore::new();
        for (i, email) in ["a@x.com", "b@x.com", "c@x.com"].iter().enumerate() {
            store
                .insert(new_user(&format!("User {i}"), email))
                .await
                .unwrap();
        }
        let ids: Vec<i32> = store
            .list_all_ordered_by_id_desc()
            .await
            .unwrap()
            .iter()
            .map(|u| u.id.as_i32())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_seed_keeps_id_and_advances_counter() {
        let store = MemoryUserStore::new();
        store
            .seed(StoredUser {
                id: UserId::new(7),
                name: "Legacy".to_owned(),
                email: Email::parse("legacy@x.com").unwrap(),
                password_hash: None,
                role: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let next = store.insert(new_user("Next", "n@x.com")).await.unwrap();
        assert_eq!(next.id, UserId::new(8));
        assert!(store.delete(UserId::new(7)).await.unwrap());
        assert!(store.find_by_email("legacy@x.com").await.unwrap().is_none());
    }
}
