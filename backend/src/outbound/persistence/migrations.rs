//! Embedded schema migrations.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::DocumentRepositoryError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration to `database_url`.
///
/// Blocks on a synchronous connection; call it from `spawn_blocking` inside
/// an async runtime.
///
/// # Errors
///
/// Returns a connection error when the database is unreachable and a query
/// error when a migration fails.
pub fn run_migrations(database_url: &str) -> Result<(), DocumentRepositoryError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| DocumentRepositoryError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| DocumentRepositoryError::query(format!("migration: {err}")))?;
    info!(applied = applied.len(), "database migrations complete");
    Ok(())
}
