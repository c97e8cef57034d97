//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{BeerCommand, BeerQuery, FixtureBeerCommand, FixtureBeerQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub beers: Arc<dyn BeerCommand>,
    pub beers_query: Arc<dyn BeerQuery>,
}

impl HttpState {
    /// Construct state from the catalog driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use beer_catalog::domain::ports::{FixtureBeerCommand, FixtureBeerQuery};
    /// use beer_catalog::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureBeerCommand), Arc::new(FixtureBeerQuery));
    /// let _query = state.beers_query.clone();
    /// ```
    pub fn new(beers: Arc<dyn BeerCommand>, beers_query: Arc<dyn BeerQuery>) -> Self {
        Self { beers, beers_query }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixtureBeerCommand), Arc::new(FixtureBeerQuery))
    }
}
