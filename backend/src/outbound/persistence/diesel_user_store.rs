//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.
//!
//! Compare-and-swap is a single `UPDATE ... WHERE` that matches every column
//! against the expected record, so PostgreSQL's row locking makes the check
//! and the write atomic. When no row matches, a follow-up lookup tells a
//! concurrent modification apart from a concurrent delete.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde_json::Value;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{Email, UserRecord};

use super::diesel_error_mapping::{map_diesel_error, map_insert_error, map_pool_error};
use super::models::{UserRow, UserRowRef};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn find_row<C>(conn: &mut C, email: &str) -> Result<Option<UserRow>, UserStoreError>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    users::table
        .filter(users::email.eq(email))
        .select(UserRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)
}

/// Decide why a compare-and-swap matched no rows.
async fn classify_swap_miss<C>(conn: &mut C, email: &str) -> UserStoreError
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    match find_row(conn, email).await {
        Ok(Some(_)) => UserStoreError::stale(email),
        Ok(None) => UserStoreError::not_found(email),
        Err(err) => err,
    }
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        find_row(&mut conn, email.as_ref())
            .await?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn insert(&self, record: &UserRecord) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(UserRowRef::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, record.email().as_ref()))
    }

    async fn replace_if_unchanged(
        &self,
        expected: &UserRecord,
        replacement: &UserRecord,
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email = expected.email().as_ref();
        let expected_attributes = Value::Object(expected.attributes().clone());

        let updated_rows = diesel::update(users::table)
            .filter(users::email.eq(email))
            .filter(users::first_name.eq(expected.first_name()))
            .filter(users::last_name.eq(expected.last_name()))
            .filter(users::password.eq(expected.password()))
            .filter(users::attributes.eq(expected_attributes))
            .set(UserRowRef::from(replacement))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err(classify_swap_miss(&mut conn, email).await);
        }
        Ok(())
    }

    async fn delete(&self, email: &Email) -> Result<bool, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.filter(users::email.eq(email.as_ref())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
