//! Currency conversion adapters.
//!
//! [`CurrencyLayerConverter`] fetches live quotes over HTTP;
//! [`StaticRateConverter`] answers from a fixed quote table for offline
//! development and tests. Both derive cross rates from quotes against a
//! common base currency.

mod dto;
mod http_source;
mod static_rates;

pub use http_source::{CurrencyLayerConverter, DEFAULT_CURRENCY_ENDPOINT};
pub use static_rates::{StaticRateConverter, StaticRateError};
