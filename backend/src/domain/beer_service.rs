//! Beer catalog domain services.
//!
//! [`BeerCommandService`] implements the create command and
//! [`BeerQueryService`] the three catalog queries. Both depend only on the
//! [`BeerRepository`] port (and, for pricing, [`CurrencyConverter`]); each
//! call performs its repository and converter steps sequentially and stops at
//! the first failure.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::ports::{
    BeerCommand, BeerQuery, BeerRepository, BeerResponse, BoxPriceRequest, BoxPriceResponse,
    CreateBeerRequest, CreateBeerResponse, CurrencyConversionError, CurrencyConverter,
    DocumentRepositoryError, Filter, GetBeerRequest, ListBeersRequest, ListBeersResponse, Page,
    Sort,
};
use crate::domain::{AuditStamp, Beer, DocumentId, Error, NewBeer};

/// Identity recorded as the creator of every beer.
pub const CATALOG_CREATOR: &str = "admin";

const DUPLICATE_ID_MESSAGE: &str = "An element with the same id already exists.";
const NAME_FIELD: &str = "name";

fn map_repository_error(error: DocumentRepositoryError) -> Error {
    Error::internal(format!("beer repository error: {error}"))
}

fn map_conversion_error(error: CurrencyConversionError) -> Error {
    Error::internal(format!("currency conversion failed: {error}"))
}

/// Beer service implementing the command driving port.
#[derive(Clone)]
pub struct BeerCommandService<R: ?Sized> {
    beer_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> BeerCommandService<R> {
    /// Create a command service over the beer repository and a clock used to
    /// stamp creation times.
    pub fn new(beer_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { beer_repo, clock }
    }
}

#[async_trait]
impl<R> BeerCommand for BeerCommandService<R>
where
    R: BeerRepository + ?Sized,
{
    async fn create_beer(&self, request: CreateBeerRequest) -> Result<CreateBeerResponse, Error> {
        let new_beer = NewBeer::try_from(request.beer)?;
        let id = new_beer.id();

        let existing = self
            .beer_repo
            .count(&Filter::id(id))
            .await
            .map_err(map_repository_error)?;
        if existing > 0 {
            warn!(%id, "rejecting beer with duplicate identifier");
            return Err(Error::conflict(DUPLICATE_ID_MESSAGE));
        }

        let beer = new_beer.stamp(AuditStamp {
            created_at: self.clock.utc(),
            created_by: CATALOG_CREATOR.to_owned(),
        });

        match self.beer_repo.insert_one(&beer).await {
            Ok(stored) => {
                debug!(id = %stored, "beer created");
                Ok(CreateBeerResponse { id: stored })
            }
            // Lost a race with a concurrent create for the same identifier.
            Err(DocumentRepositoryError::Duplicate { id }) => {
                warn!(%id, "duplicate identifier rejected by the store");
                Err(Error::conflict(DUPLICATE_ID_MESSAGE))
            }
            Err(error) => Err(map_repository_error(error)),
        }
    }
}

/// Beer service implementing the query driving port.
#[derive(Clone)]
pub struct BeerQueryService<R: ?Sized, C: ?Sized> {
    beer_repo: Arc<R>,
    converter: Arc<C>,
}

impl<R: ?Sized, C: ?Sized> BeerQueryService<R, C> {
    /// Create a query service over the beer repository and currency converter.
    pub fn new(beer_repo: Arc<R>, converter: Arc<C>) -> Self {
        Self {
            beer_repo,
            converter,
        }
    }
}

impl<R, C> BeerQueryService<R, C>
where
    R: BeerRepository + ?Sized,
    C: CurrencyConverter + ?Sized,
{
    async fn require_beer(&self, id: DocumentId) -> Result<Beer, Error> {
        self.beer_repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("beer {id} not found")))
    }
}

#[async_trait]
impl<R, C> BeerQuery for BeerQueryService<R, C>
where
    R: BeerRepository + ?Sized,
    C: CurrencyConverter + ?Sized,
{
    async fn get_beer(&self, request: GetBeerRequest) -> Result<BeerResponse, Error> {
        self.require_beer(request.id).await.map(BeerResponse::from)
    }

    async fn list_beers(&self, request: ListBeersRequest) -> Result<ListBeersResponse, Error> {
        let filter = Filter::contains(NAME_FIELD, request.name);

        let total = self
            .beer_repo
            .count(&filter)
            .await
            .map_err(map_repository_error)?;
        let beers = self
            .beer_repo
            .paginated(&filter, &Sort::default(), request.window)
            .await
            .map_err(map_repository_error)?;

        Ok(Page::new(request.window, total, beers).map(BeerResponse::from))
    }

    async fn box_price(&self, request: BoxPriceRequest) -> Result<BoxPriceResponse, Error> {
        let beer = self.require_beer(request.id).await?;
        let native = beer.currency().clone();

        let (unit_price, currency) = match request.currency {
            Some(target) if !target.is_same_as(&native) => {
                let rate = self
                    .converter
                    .rate(&native, &target)
                    .await
                    .map_err(|error| {
                        warn!(%error, source = %native, %target, "exchange rate lookup failed");
                        map_conversion_error(error)
                    })?;
                let converted = beer.price().checked_mul(rate.value()).ok_or_else(|| {
                    Error::internal(format!("converted price of beer {} overflowed", request.id))
                })?;
                (converted, target)
            }
            _ => (beer.price(), native),
        };

        let price_total = unit_price
            .checked_mul(Decimal::from(request.quantity))
            .ok_or_else(|| Error::internal(format!("box price of beer {} overflowed", request.id)))?;

        Ok(BoxPriceResponse {
            price_total,
            currency,
        })
    }
}

#[cfg(test)]
#[path = "beer_service_tests.rs"]
mod tests;
