use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User, UserChanges};

/// Process-local store. Each write checks email uniqueness and applies the
/// change under a single lock, so it gives the same guarantee as the
/// `UNIQUE` constraint on the Postgres table.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users
            .lock()
            .map_err(|_| StoreError::Other(anyhow::anyhow!("user store lock poisoned")))
    }

    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.lock()?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            provider: user.provider,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let mut users = self.lock()?;
        if let Some(email) = changes.email.as_deref() {
            if users.values().any(|u| u.id != id && u.email == email) {
                return Err(StoreError::EmailTaken);
            }
        }
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "A".into(),
            email: email.into(),
            password_hash: "hash".into(),
            provider: false,
        }
    }

    #[tokio::test]
    async fn create_enforces_unique_email() {
        let store = InMemoryUserStore::new();
        let first = store.create(new_user("a@x.com")).await.unwrap();
        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
        assert_eq!(store.len(), 1);
        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn update_is_partial_and_guards_email() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("a@x.com")).await.unwrap();
        store.create(new_user("b@x.com")).await.unwrap();

        let err = store
            .update(a.id, UserChanges { email: Some("b@x.com".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));

        let updated = store
            .update(a.id, UserChanges { name: Some("B".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.name, "B");
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(updated.password_hash, "hash");

        // keeping your own email is not a conflict
        store
            .update(a.id, UserChanges { email: Some("a@x.com".into()), ..Default::default() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_missing_user() {
        let store = InMemoryUserStore::new();
        let err = store
            .update(Uuid::new_v4(), UserChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
