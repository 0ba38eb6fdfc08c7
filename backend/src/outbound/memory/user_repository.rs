//! In-memory `UserRepository`.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserId, Username};

use super::lock;

/// User store keyed by id with a unique-username check on insert.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut users = lock(&self.users);
        if users.values().any(|stored| stored.username() == &user.username) {
            return Err(UserPersistenceError::duplicate_username(
                user.username.as_ref(),
            ));
        }

        let raw_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = UserId::new(raw_id)
            .map_err(|err| UserPersistenceError::query(format!("id allocation failed: {err}")))?;
        let stored = User::new(
            id,
            user.username.clone(),
            user.password_hash.clone(),
            user.created_at,
        );
        users.insert(raw_id, stored.clone());
        Ok(stored)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = lock(&self.users);
        Ok(users
            .values()
            .find(|stored| stored.username() == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PasswordHash;
    use chrono::Utc;
    use rstest::rstest;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: Username::new(name).expect("username"),
            password_hash: PasswordHash::new("hash"),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(&new_user("alice")).await.expect("alice");
        let bob = repo.create(&new_user("bob")).await.expect("bob");

        assert_eq!(alice.id().as_i64(), 1);
        assert_eq!(bob.id().as_i64(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(&new_user("alice")).await.expect("first");

        let error = repo
            .create(&new_user("alice"))
            .await
            .expect_err("duplicate");

        assert_eq!(error, UserPersistenceError::duplicate_username("alice"));
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(&new_user("alice")).await.expect("alice");

        let found = repo
            .find_by_username(&Username::new("alice").expect("username"))
            .await
            .expect("lookup");
        let missing = repo
            .find_by_username(&Username::new("Alice").expect("username"))
            .await
            .expect("lookup");

        assert_eq!(found, Some(alice));
        assert_eq!(missing, None);
    }
}
