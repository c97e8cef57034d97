//! DTOs for decoding currencylayer `live` responses.
//!
//! The adapter decodes into these transport DTOs first, then looks quotes up
//! as exact decimals.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::CurrencyCode;
use crate::domain::ports::CurrencyConversionError;

const DEFAULT_BASE: &str = "USD";

#[derive(Debug, Deserialize)]
pub(super) struct LiveQuotesDto {
    #[serde(default)]
    pub(super) success: Option<bool>,
    #[serde(default)]
    pub(super) source: Option<String>,
    #[serde(default)]
    pub(super) quotes: BTreeMap<String, Value>,
    #[serde(default)]
    pub(super) error: Option<ProviderErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProviderErrorDto {
    #[serde(default)]
    pub(super) code: Option<i64>,
    #[serde(default)]
    pub(super) info: Option<String>,
}

impl LiveQuotesDto {
    /// Reject provider-level failures reported with a 2xx status.
    pub(super) fn ensure_success(&self) -> Result<(), CurrencyConversionError> {
        if self.success != Some(false) {
            return Ok(());
        }
        let detail = self
            .error
            .as_ref()
            .map(|error| {
                format!(
                    "code {}: {}",
                    error.code.map_or_else(|| "?".to_owned(), |code| code.to_string()),
                    error.info.as_deref().unwrap_or("no detail")
                )
            })
            .unwrap_or_else(|| "provider reported failure".to_owned());
        Err(CurrencyConversionError::upstream(detail))
    }

    fn base(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_BASE)
    }

    /// Units of `currency` per unit of the base currency.
    pub(super) fn quote(&self, currency: &CurrencyCode) -> Result<Decimal, CurrencyConversionError> {
        let base = self.base();
        let code = currency.canonical();
        if code.eq_ignore_ascii_case(base) {
            return Ok(Decimal::ONE);
        }
        let key = format!("{base}{code}");
        let raw = self
            .quotes
            .get(&key)
            .ok_or_else(|| CurrencyConversionError::missing_quote(code))?;
        parse_quote(currency, raw)
    }
}

fn parse_quote(currency: &CurrencyCode, raw: &Value) -> Result<Decimal, CurrencyConversionError> {
    let Value::Number(number) = raw else {
        return Err(CurrencyConversionError::invalid_quote(
            currency.canonical(),
            format!("expected a number, found {raw}"),
        ));
    };
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|err| CurrencyConversionError::invalid_quote(currency.canonical(), err.to_string()))
}
