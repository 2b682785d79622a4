//! Integration tests for `DieselUserStore` against embedded PostgreSQL.
//!
//! The compare-and-swap write is checked against a real database: a matching
//! snapshot swaps, a superseded snapshot is `Stale`, a deleted row is
//! `NotFound`, and JSONB attributes come back unchanged so version tokens
//! stay stable across a store round trip.

use std::sync::Arc;

use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use serde_json::json;
use tokio::runtime::Runtime;

use user_directory::domain::ports::{
    NoOpNotificationSink, UserDirectory, UserStore, UserStoreError,
};
use user_directory::domain::{
    ConditionalUpdateCoordinator, Email, TokenSigner, UserFields, UserRecord, UserRecordService,
};
use user_directory::outbound::persistence::{DbPool, DieselUserStore, PoolConfig};

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{handle_cluster_setup_failure, provision_database};

struct TestContext {
    runtime: Runtime,
    store: DieselUserStore,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = provision_database()?;
    let config = PoolConfig::new(database.url().to_string()).with_max_size(2);
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        store: DieselUserStore::new(pool),
        _database: database,
    })
}

#[fixture]
fn store_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[fixture]
fn record() -> UserRecord {
    UserRecord::new(Email::new("u@x.com").expect("email"), "Una", "Xu", "pw")
        .try_with_attributes(
            json!({"status": "ACTIVE", "prefs": {"theme": "dark", "tags": ["a", "b"]}})
                .as_object()
                .cloned()
                .expect("attributes object"),
        )
        .expect("attributes")
}

fn renamed(record: &UserRecord, first_name: &str) -> UserRecord {
    record
        .merged_with(&UserFields::from_value(json!({ "first_name": first_name })).expect("object"))
        .expect("merge")
}

#[rstest]
fn swap_with_matching_snapshot_replaces_the_row(
    store_context: Option<TestContext>,
    record: UserRecord,
) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: swap_with_matching_snapshot_replaces_the_row skipped");
        return;
    };
    let replacement = renamed(&record, "New");

    let stored = ctx.runtime.block_on(async {
        ctx.store.insert(&record).await.expect("insert");
        ctx.store
            .replace_if_unchanged(&record, &replacement)
            .await
            .expect("swap succeeds");
        ctx.store.find_by_email(record.email()).await.expect("fetch")
    });

    assert_eq!(stored, Some(replacement));
}

#[rstest]
fn swap_with_superseded_snapshot_is_stale(store_context: Option<TestContext>, record: UserRecord) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: swap_with_superseded_snapshot_is_stale skipped");
        return;
    };
    let winner = renamed(&record, "Left");
    let loser = renamed(&record, "Right");

    let (outcome, stored) = ctx.runtime.block_on(async {
        ctx.store.insert(&record).await.expect("insert");
        ctx.store
            .replace_if_unchanged(&record, &winner)
            .await
            .expect("first swap wins");
        let outcome = ctx.store.replace_if_unchanged(&record, &loser).await;
        let stored = ctx.store.find_by_email(record.email()).await.expect("fetch");
        (outcome, stored)
    });

    assert!(
        matches!(outcome, Err(UserStoreError::Stale { .. })),
        "expected Stale, got {outcome:?}"
    );
    assert_eq!(stored, Some(winner));
}

#[rstest]
fn swap_after_delete_is_not_found(store_context: Option<TestContext>, record: UserRecord) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: swap_after_delete_is_not_found skipped");
        return;
    };
    let replacement = renamed(&record, "New");

    let outcome = ctx.runtime.block_on(async {
        ctx.store.insert(&record).await.expect("insert");
        assert!(ctx.store.delete(record.email()).await.expect("delete"));
        ctx.store.replace_if_unchanged(&record, &replacement).await
    });

    assert!(
        matches!(outcome, Err(UserStoreError::NotFound { .. })),
        "expected NotFound, got {outcome:?}"
    );
}

#[rstest]
fn registered_token_survives_the_jsonb_round_trip(store_context: Option<TestContext>) {
    let Some(ctx) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: registered_token_survives_the_jsonb_round_trip skipped");
        return;
    };
    let records = UserRecordService::new(
        Arc::new(ctx.store.clone()),
        Arc::new(NoOpNotificationSink),
    );
    let directory = ConditionalUpdateCoordinator::new(
        records,
        Arc::new(TokenSigner::derive_from(b"embedded postgres token secret")),
    );
    let fields = UserFields::from_value(json!({
        "last_name": "Xu",
        "first_name": "Una",
        "email": "u@x.com",
        "password": "pw",
        "status": "ACTIVE",
        "prefs": {"theme": "dark", "tags": ["a", "b"], "limits": {"max": 3, "min": 1}},
    }))
    .expect("object");

    let (registered, fetched) = ctx.runtime.block_on(async {
        let registered = directory.register(fields).await.expect("register");
        let fetched = directory
            .fetch(registered.record.email())
            .await
            .expect("fetch");
        (registered, fetched)
    });

    assert_eq!(fetched.record, registered.record);
    assert_eq!(fetched.token, registered.token);
}
