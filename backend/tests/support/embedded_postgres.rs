//! Embedded PostgreSQL provisioning for store integration tests.
//!
//! Each test gets a fresh temporary database on the shared embedded cluster
//! with the crate's migrations applied. Set `SKIP_TEST_CLUSTER=1` to skip
//! suites in environments where the cluster cannot start.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use user_directory::outbound::persistence::run_pending_migrations;

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub(crate) fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, otherwise fail loudly.
pub(crate) fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Create a migrated temporary database on the shared cluster.
pub(crate) fn provision_database() -> Result<TemporaryDatabase, String> {
    ensure_stable_password();
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let name = format!("user_directory_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| err.to_string())?;
    let url = database.url().to_string();
    run_pending_migrations(&url).map_err(|err| err.to_string())?;
    Ok(database)
}

/// Pin `PG_PASSWORD` so a reused data directory keeps accepting logins.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns threads and the
        // shared cluster singleton serialises the first call.
        unsafe {
            std::env::set_var("PG_PASSWORD", "user_directory_embedded_test");
        }
    }
}
