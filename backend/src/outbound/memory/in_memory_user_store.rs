//! `UserStore` backed by a mutex-guarded map.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{Email, UserRecord};

/// In-memory user store.
///
/// The lock is held across the comparison and the write in
/// [`UserStore::replace_if_unchanged`], which makes it an atomic
/// compare-and-swap.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: Mutex<HashMap<Email, UserRecord>>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Email, UserRecord>>, UserStoreError> {
        self.records
            .lock()
            .map_err(|_| UserStoreError::connection("in-memory user store lock poisoned"))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self.lock()?.get(email).cloned())
    }

    async fn insert(&self, record: &UserRecord) -> Result<(), UserStoreError> {
        let mut records = self.lock()?;
        if records.contains_key(record.email()) {
            return Err(UserStoreError::duplicate(record.email().as_ref()));
        }
        records.insert(record.email().clone(), record.clone());
        Ok(())
    }

    async fn replace_if_unchanged(
        &self,
        expected: &UserRecord,
        replacement: &UserRecord,
    ) -> Result<(), UserStoreError> {
        let mut records = self.lock()?;
        match records.get_mut(expected.email()) {
            None => Err(UserStoreError::not_found(expected.email().as_ref())),
            Some(current) if current != expected => {
                Err(UserStoreError::stale(expected.email().as_ref()))
            }
            Some(current) => {
                *current = replacement.clone();
                Ok(())
            }
        }
    }

    async fn delete(&self, email: &Email) -> Result<bool, UserStoreError> {
        Ok(self.lock()?.remove(email).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::UserFields;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn record() -> UserRecord {
        UserRecord::new(Email::new("u@x.com").expect("email"), "Una", "Xu", "pw")
    }

    fn renamed(record: &UserRecord, first_name: &str) -> UserRecord {
        record
            .merged_with(
                &UserFields::from_value(json!({ "first_name": first_name })).expect("object"),
            )
            .expect("merge")
    }

    #[rstest]
    #[tokio::test]
    async fn insert_then_find_round_trips(record: UserRecord) {
        let store = InMemoryUserStore::new();
        store.insert(&record).await.expect("insert");
        let found = store.find_by_email(record.email()).await.expect("find");
        assert_eq!(found, Some(record));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_insert_is_rejected(record: UserRecord) {
        let store = InMemoryUserStore::new();
        store.insert(&record).await.expect("first insert");
        let err = store.insert(&record).await.expect_err("duplicate");
        assert_eq!(err, UserStoreError::duplicate("u@x.com"));
    }

    #[rstest]
    #[tokio::test]
    async fn swap_rejects_changed_content(record: UserRecord) {
        let store = InMemoryUserStore::new();
        store.insert(&record).await.expect("insert");
        let first = renamed(&record, "First");
        store
            .replace_if_unchanged(&record, &first)
            .await
            .expect("first swap wins");

        let err = store
            .replace_if_unchanged(&record, &renamed(&record, "Second"))
            .await
            .expect_err("second swap loses");
        assert_eq!(err, UserStoreError::stale("u@x.com"));
        let stored = store.find_by_email(record.email()).await.expect("find");
        assert_eq!(stored, Some(first));
    }

    #[rstest]
    #[tokio::test]
    async fn swap_on_deleted_record_is_not_found(record: UserRecord) {
        let store = InMemoryUserStore::new();
        let err = store
            .replace_if_unchanged(&record, &renamed(&record, "Ghost"))
            .await
            .expect_err("missing");
        assert_eq!(err, UserStoreError::not_found("u@x.com"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_swaps_have_exactly_one_winner(record: UserRecord) {
        let store = Arc::new(InMemoryUserStore::new());
        store.insert(&record).await.expect("insert");

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = Arc::clone(&store);
                let expected = record.clone();
                let replacement = renamed(&record, &format!("writer-{n}"));
                tokio::spawn(async move {
                    store.replace_if_unchanged(&expected, &replacement).await
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.expect("task joins") {
                Ok(()) => winners += 1,
                Err(err) => assert_eq!(err, UserStoreError::stale("u@x.com")),
            }
        }
        assert_eq!(winners, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_a_record_existed(record: UserRecord) {
        let store = InMemoryUserStore::new();
        store.insert(&record).await.expect("insert");
        assert!(store.delete(record.email()).await.expect("delete"));
        assert!(!store.delete(record.email()).await.expect("second delete"));
    }
}
