//! Internal Diesel row structs for the `users` table.
//!
//! These types never leave the persistence layer; the adapter converts them
//! to and from [`UserRecord`].

use diesel::prelude::*;
use serde_json::Value;

use crate::domain::ports::UserStoreError;
use crate::domain::{Email, UserRecord};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub attributes: Value,
}

/// Insertable and changeset struct borrowing from a domain record.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserRowRef<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
    pub attributes: Value,
}

impl<'a> From<&'a UserRecord> for UserRowRef<'a> {
    fn from(record: &'a UserRecord) -> Self {
        Self {
            email: record.email().as_ref(),
            first_name: record.first_name(),
            last_name: record.last_name(),
            password: record.password(),
            attributes: Value::Object(record.attributes().clone()),
        }
    }
}

impl TryFrom<UserRow> for UserRecord {
    type Error = UserStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(row.email)
            .map_err(|err| UserStoreError::query(format!("stored email is invalid: {err}")))?;
        let Value::Object(attributes) = row.attributes else {
            return Err(UserStoreError::query(format!(
                "stored attributes for {email} are not an object"
            )));
        };
        UserRecord::new(email, row.first_name, row.last_name, row.password)
            .try_with_attributes(attributes)
            .map_err(|err| UserStoreError::query(format!("stored attributes are invalid: {err}")))
    }
}
