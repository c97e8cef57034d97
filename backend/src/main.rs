//! Beer catalog entry-point: loads settings, prepares storage and the
//! currency converter, then serves the REST API.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use beer_catalog::domain::ports::CurrencyConverter;
use beer_catalog::inbound::http::health::HealthState;
use beer_catalog::outbound::currency::{CurrencyLayerConverter, StaticRateConverter};
use beer_catalog::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use beer_catalog::settings::{ServiceSettings, StorageBackend};
use ortho_config::OrthoConfig;

use server::{ServerConfig, create_server};

/// Build the currency converter: live quotes when an API key is configured,
/// otherwise the static table.
fn build_converter(settings: &ServiceSettings) -> io::Result<Arc<dyn CurrencyConverter>> {
    if let Some(key) = settings.currency_api_key() {
        let endpoint = settings.currency_api_url().map_err(io::Error::other)?;
        info!(endpoint = %endpoint, "using live currency conversion");
        let converter = CurrencyLayerConverter::new(endpoint, key, settings.currency_timeout())
            .map_err(io::Error::other)?;
        return Ok(Arc::new(converter));
    }

    let entries = settings.static_rate_entries();
    warn!(
        quotes = entries.len(),
        "no currency API key configured; using static exchange rates"
    );
    let converter = StaticRateConverter::from_entries(entries).map_err(io::Error::other)?;
    Ok(Arc::new(converter))
}

/// Run the bootstrap migration on a blocking thread, then open the pool.
async fn connect_postgres(settings: &ServiceSettings) -> io::Result<DbPool> {
    let database_url = settings.database_url().map_err(io::Error::other)?.to_owned();
    let migration_url = database_url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::other)?;

    let config = PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
    DbPool::new(config).await.map_err(io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let converter = build_converter(&settings)?;

    let mut config = ServerConfig::new(bind_addr, converter);
    match settings.storage().map_err(io::Error::other)? {
        StorageBackend::Memory => info!("using in-memory document store"),
        StorageBackend::Postgres => {
            config = config.with_db_pool(connect_postgres(&settings).await?);
            info!("using postgres document store");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting beer catalog");
    create_server(health_state, config)?.await
}
