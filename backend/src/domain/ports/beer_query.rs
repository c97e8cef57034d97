//! Driving port for catalog reads.
//!
//! Results are projections: they never carry the audit metadata stored with
//! each beer.

use async_trait::async_trait;
use pagination::{Page, PageWindow};
use rust_decimal::Decimal;

use crate::domain::{Beer, CurrencyCode, Document, DocumentId, Error};

/// Read projection of a beer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeerResponse {
    /// Identifier.
    pub id: DocumentId,
    /// Beer name.
    pub name: String,
    /// Brewery name.
    pub brewery: String,
    /// Country of origin.
    pub country: String,
    /// Unit price in `currency`.
    pub price: Decimal,
    /// Currency of `price`.
    pub currency: CurrencyCode,
}

impl From<Beer> for BeerResponse {
    fn from(value: Beer) -> Self {
        Self {
            id: value.id(),
            name: value.name().to_owned(),
            brewery: value.brewery().to_owned(),
            country: value.country().to_owned(),
            price: value.price(),
            currency: value.currency().clone(),
        }
    }
}

/// Request to fetch one beer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetBeerRequest {
    /// Identifier to look up.
    pub id: DocumentId,
}

/// Request to list beers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBeersRequest {
    /// Case-insensitive name substring; blank matches every beer.
    pub name: String,
    /// Page to return.
    pub window: PageWindow,
}

/// One page of beers plus the total number of matches.
pub type ListBeersResponse = Page<BeerResponse>;

/// Request to price a box of one beer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxPriceRequest {
    /// Beer to price.
    pub id: DocumentId,
    /// Currency to price in; `None` keeps the beer's own currency.
    pub currency: Option<CurrencyCode>,
    /// Number of units in the box.
    pub quantity: u32,
}

/// Total price of a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxPriceResponse {
    /// Unit price times quantity, after conversion.
    pub price_total: Decimal,
    /// Currency of `price_total`.
    pub currency: CurrencyCode,
}

/// Driving port for catalog read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BeerQuery: Send + Sync {
    /// Fetch one beer; `NotFound` when absent.
    async fn get_beer(&self, request: GetBeerRequest) -> Result<BeerResponse, Error>;

    /// List beers whose name contains the filter, in identifier order.
    async fn list_beers(&self, request: ListBeersRequest) -> Result<ListBeersResponse, Error>;

    /// Price a box of a beer, converting currency when asked.
    async fn box_price(&self, request: BoxPriceRequest) -> Result<BoxPriceResponse, Error>;
}

/// Fixture query serving a single "Lager" priced at 10 USD under id 1.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBeerQuery;

impl FixtureBeerQuery {
    fn lager() -> Result<BeerResponse, Error> {
        let currency = CurrencyCode::parse("USD")
            .map_err(|err| Error::internal(format!("fixture currency: {err}")))?;
        Ok(BeerResponse {
            id: DocumentId::new(1),
            name: "Lager".to_owned(),
            brewery: "Fixture Brewing".to_owned(),
            country: "Nowhere".to_owned(),
            price: Decimal::TEN,
            currency,
        })
    }
}

#[async_trait]
impl BeerQuery for FixtureBeerQuery {
    async fn get_beer(&self, request: GetBeerRequest) -> Result<BeerResponse, Error> {
        let lager = Self::lager()?;
        if request.id == lager.id {
            Ok(lager)
        } else {
            Err(Error::not_found(format!("beer {} not found", request.id)))
        }
    }

    async fn list_beers(&self, request: ListBeersRequest) -> Result<ListBeersResponse, Error> {
        let lager = Self::lager()?;
        let matches = lager
            .name
            .to_lowercase()
            .contains(&request.name.trim().to_lowercase());
        let (total, data) = if matches && request.window.start() == 0 && request.window.page_size() > 0 {
            (1, vec![lager])
        } else {
            (u64::from(matches), Vec::new())
        };
        Ok(Page::new(request.window, total, data))
    }

    async fn box_price(&self, request: BoxPriceRequest) -> Result<BoxPriceResponse, Error> {
        let lager = self.get_beer(GetBeerRequest { id: request.id }).await?;
        match request.currency {
            Some(currency) if currency != lager.currency => Err(Error::internal(format!(
                "no exchange rate from {} to {currency}",
                lager.currency
            ))),
            _ => Ok(BoxPriceResponse {
                price_total: lager.price * Decimal::from(request.quantity),
                currency: lager.currency,
            }),
        }
    }
}
