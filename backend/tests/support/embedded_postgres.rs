//! Temporary catalog databases on the shared embedded cluster.
//!
//! Each suite gets a fresh database with the crate's embedded migrations
//! applied, so tests see the same `documents` schema as production.

use beer_catalog::domain::ports::DocumentRepositoryError;
use beer_catalog::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

/// Create an empty database on `cluster` and migrate it.
///
/// The database is dropped when the returned guard goes out of scope.
pub fn provision_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, DocumentRepositoryError> {
    let name = format!("catalog_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| DocumentRepositoryError::connection(format!("create database: {err:?}")))?;
    let url = database.url().to_string();
    run_migrations(&url)?;
    Ok(database)
}
