//! Fixed-table currency converter.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::CurrencyCode;
use crate::domain::ports::{CurrencyConversionError, CurrencyConverter, ExchangeRate};

/// Errors raised while parsing `CODE=quote` entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StaticRateError {
    /// The entry is not of the form `CODE=quote`.
    #[error("rate entry `{entry}` must look like CODE=quote")]
    Malformed { entry: String },
    /// The currency code is not valid.
    #[error("rate entry `{entry}` has an invalid currency code")]
    InvalidCurrency { entry: String },
    /// The quote is not a positive decimal.
    #[error("rate entry `{entry}` must carry a positive decimal quote")]
    InvalidQuote { entry: String },
}

const BASE_CURRENCY: &str = "USD";

/// Converter answering from in-memory quotes against USD.
///
/// Codes are matched without regard to letter case.
///
/// # Examples
/// ```
/// use beer_catalog::outbound::currency::StaticRateConverter;
///
/// assert!(StaticRateConverter::from_entries(["EUR=0.9", "gbp = 0.8"]).is_ok());
/// assert!(StaticRateConverter::from_entries(["EUR"]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRateConverter {
    quotes: HashMap<String, Decimal>,
}

impl StaticRateConverter {
    /// Parse `CODE=quote` entries quoted against USD.
    ///
    /// # Errors
    ///
    /// Returns [`StaticRateError`] naming the first unusable entry.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, StaticRateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .try_fold(Self::default(), |table, entry| {
                let (code, quote) = parse_entry(entry.as_ref())?;
                Ok(table.with_quote(&code, quote))
            })
    }

    fn with_quote(mut self, currency: &CurrencyCode, quote: ExchangeRate) -> Self {
        self.quotes.insert(currency.canonical(), quote.value());
        self
    }

    fn quote(&self, currency: &CurrencyCode) -> Result<Decimal, CurrencyConversionError> {
        let key = currency.canonical();
        if key == BASE_CURRENCY {
            return Ok(Decimal::ONE);
        }
        self.quotes
            .get(&key)
            .copied()
            .ok_or_else(|| CurrencyConversionError::missing_quote(key))
    }
}

fn parse_entry(entry: &str) -> Result<(CurrencyCode, ExchangeRate), StaticRateError> {
    let (code, quote) = entry
        .split_once('=')
        .ok_or_else(|| StaticRateError::Malformed {
            entry: entry.to_owned(),
        })?;
    let code = CurrencyCode::parse(code.trim()).map_err(|_| StaticRateError::InvalidCurrency {
        entry: entry.to_owned(),
    })?;
    let quote = Decimal::from_str(quote.trim())
        .ok()
        .and_then(ExchangeRate::new)
        .ok_or_else(|| StaticRateError::InvalidQuote {
            entry: entry.to_owned(),
        })?;
    Ok((code, quote))
}

#[async_trait]
impl CurrencyConverter for StaticRateConverter {
    async fn rate(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<ExchangeRate, CurrencyConversionError> {
        if source.is_same_as(target) {
            return Ok(ExchangeRate::IDENTITY);
        }
        let source_quote = self.quote(source)?;
        let target_quote = self.quote(target)?;
        ExchangeRate::cross(source, source_quote, target, target_quote)
    }
}
