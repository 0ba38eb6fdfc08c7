//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Usernames are unique at the database level; a unique violation on insert
//! is reported as [`UserPersistenceError::DuplicateUsername`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, PasswordHash, User, UserId, Username};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row to a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = UserId::new(row.id)
        .map_err(|err| UserPersistenceError::query(format!("invalid stored user id: {err}")))?;
    let username = Username::new(&row.username)
        .map_err(|err| UserPersistenceError::query(format!("invalid stored username: {err}")))?;
    Ok(User::new(
        id,
        username,
        PasswordHash::new(row.password_hash),
        row.created_at,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            username: user.username.as_ref(),
            password_hash: user.password_hash.as_str(),
            created_at: user.created_at,
        };

        let row = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_username(user.username.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })?;

        row_to_user(row)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(id: i64, username: &str) -> UserRow {
        UserRow {
            id,
            username: username.to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_converts_to_domain_user() {
        let user = row_to_user(row(4, "alice")).expect("valid row");
        assert_eq!(user.id().as_i64(), 4);
        assert_eq!(user.username().as_ref(), "alice");
        assert_eq!(user.password_hash().as_str(), "$argon2id$stub");
    }

    #[rstest]
    #[case(row(-1, "alice"))]
    #[case(row(1, ""))]
    fn corrupt_rows_are_query_errors(#[case] corrupt: UserRow) {
        let error = row_to_user(corrupt).expect_err("corrupt row");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
