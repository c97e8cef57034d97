//! Builders for HTTP state from the configured store and converter.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use beer_catalog::domain::ports::{BeerRepository, CurrencyConverter};
use beer_catalog::domain::{Beer, BeerCommandService, BeerQueryService};
use beer_catalog::inbound::http::state::HttpState;
use beer_catalog::outbound::persistence::DieselDocumentRepository;

use super::ServerConfig;
use super::config::StoreConfig;

/// Wire command and query services over one beer repository.
fn catalog_state<R>(
    beers: Arc<R>,
    converter: Arc<dyn CurrencyConverter>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    R: BeerRepository + 'static,
{
    let command = BeerCommandService::new(Arc::clone(&beers), clock);
    let query = BeerQueryService::new(beers, converter);
    HttpState::new(Arc::new(command), Arc::new(query))
}

/// Build the HTTP state for the configured document store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let converter = Arc::clone(&config.converter);
    let state = match &config.store {
        StoreConfig::Memory(store) => {
            catalog_state(Arc::new(store.repository::<Beer>()), converter, clock)
        }
        StoreConfig::Postgres(pool) => catalog_state(
            Arc::new(DieselDocumentRepository::<Beer>::new(pool.clone())),
            converter,
            clock,
        ),
    };
    web::Data::new(state)
}
