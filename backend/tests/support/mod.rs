//! Embedded PostgreSQL helpers shared by the Diesel adapter suites.
//!
//! Each call to [`migrated_database`] creates a fresh database on the shared
//! embedded cluster and applies the crate's migrations to it, so suites never
//! observe each other's rows.
//!
//! Set `SKIP_TEST_CLUSTER=1` to skip these suites on hosts that cannot start
//! the cluster; otherwise a setup failure fails the test.

use std::time::Duration;

use geodata::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use tokio::runtime::Runtime;
use uuid::Uuid;

const CLUSTER_RETRIES: u32 = 3;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when allowed, otherwise fail loudly so CI breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn database_url() -> Result<String, String> {
    let mut attempt = 1;
    let cluster = loop {
        match shared_cluster_handle() {
            Ok(cluster) => break cluster,
            Err(error) if attempt < CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt}/{CLUSTER_RETRIES} failed: {error:?}");
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("start cluster: {error:?}")),
        }
    };

    let name = format!("geodata_test_{}", Uuid::new_v4().simple());
    cluster
        .create_database(name.as_str())
        .map_err(|error| format!("create database {name}: {error:?}"))?;
    Ok(cluster.connection().database_url(&name))
}

/// Fresh, fully migrated database plus a small pool on `runtime`.
pub fn migrated_database(runtime: &Runtime) -> Result<DbPool, String> {
    let url = database_url()?;
    runtime.block_on(async {
        run_pending_migrations(&url)
            .await
            .map_err(|error| error.to_string())?;
        DbPool::new(PoolConfig::new(&url).with_max_size(2))
            .await
            .map_err(|error| error.to_string())
    })
}
