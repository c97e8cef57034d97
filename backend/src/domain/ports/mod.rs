//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports: [`DocumentRepository`] (with its named specialisation
//! [`BeerRepository`]) and [`CurrencyConverter`]. Driving ports:
//! [`BeerCommand`] and [`BeerQuery`].

mod macros;
pub(crate) use macros::define_port_error;

mod beer_command;
mod beer_query;
mod beer_repository;
mod currency_converter;
mod document_repository;

#[cfg(test)]
pub use beer_command::MockBeerCommand;
pub use beer_command::{BeerCommand, CreateBeerRequest, CreateBeerResponse, FixtureBeerCommand};
#[cfg(test)]
pub use beer_query::MockBeerQuery;
pub use beer_query::{
    BeerQuery, BeerResponse, BoxPriceRequest, BoxPriceResponse, FixtureBeerQuery,
    GetBeerRequest, ListBeersRequest, ListBeersResponse,
};
pub use beer_repository::BeerRepository;
#[cfg(test)]
pub use currency_converter::MockCurrencyConverter;
pub use currency_converter::{CurrencyConversionError, CurrencyConverter, ExchangeRate};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use document_repository::{
    DocumentRepository, DocumentRepositoryError, FieldChanges, Filter, ID_FIELD, Sort,
    SortDirection, SortKey,
};
pub use pagination::{Page, PageWindow};
