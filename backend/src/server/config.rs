//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use beer_catalog::domain::ports::CurrencyConverter;
use beer_catalog::outbound::memory::InMemoryDocumentStore;
use beer_catalog::outbound::persistence::DbPool;

/// Document store the catalog services are built on.
#[derive(Clone)]
pub enum StoreConfig {
    /// Process-local store.
    Memory(InMemoryDocumentStore),
    /// PostgreSQL through a bb8 pool.
    Postgres(DbPool),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: StoreConfig,
    pub(crate) converter: Arc<dyn CurrencyConverter>,
}

impl ServerConfig {
    /// Construct a configuration serving an empty in-memory catalog.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, converter: Arc<dyn CurrencyConverter>) -> Self {
        Self {
            bind_addr,
            store: StoreConfig::Memory(InMemoryDocumentStore::new()),
            converter,
        }
    }

    /// Attach a database connection pool; beers are then stored in Postgres.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.store = StoreConfig::Postgres(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
