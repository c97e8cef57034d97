//! Port for currency exchange rates used by box pricing.
//!
//! Adapters answer "how many units of `target` buy one unit of `source`".
//! Every failure is an explicit [`CurrencyConversionError`]; a missing or
//! unusable quote never degrades into a zero or unit rate.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::CurrencyCode;

use super::define_port_error;

define_port_error! {
    /// Errors raised by currency conversion adapters.
    pub enum CurrencyConversionError {
        /// The quote provider could not be reached.
        Transport { message: String } =>
            "currency provider transport failed: {message}",
        /// The quote provider did not answer in time.
        Timeout { message: String } =>
            "currency provider timed out: {message}",
        /// The quote provider answered with an error.
        Upstream { message: String } =>
            "currency provider rejected the request: {message}",
        /// The quote provider's answer could not be decoded.
        Decode { message: String } =>
            "currency provider response could not be decoded: {message}",
        /// No quote was available for a currency.
        MissingQuote { currency: String } =>
            "no exchange quote available for {currency}",
        /// A quote was present but unusable.
        InvalidQuote { currency: String, message: String } =>
            "exchange quote for {currency} is invalid: {message}",
    }
}

/// Positive multiplier converting an amount from one currency to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// Rate between a currency and itself.
    pub const IDENTITY: Self = Self(Decimal::ONE);

    /// Wrap a positive rate; zero and negative values are rejected.
    #[must_use]
    pub fn new(rate: Decimal) -> Option<Self> {
        (rate > Decimal::ZERO).then_some(Self(rate))
    }

    /// Cross rate `target_quote / source_quote` for two quotes against a
    /// common base currency.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyConversionError::InvalidQuote`] when either quote is
    /// not positive or the division overflows.
    pub fn cross(
        source: &CurrencyCode,
        source_quote: Decimal,
        target: &CurrencyCode,
        target_quote: Decimal,
    ) -> Result<Self, CurrencyConversionError> {
        for (code, quote) in [(source, source_quote), (target, target_quote)] {
            if quote <= Decimal::ZERO {
                return Err(CurrencyConversionError::invalid_quote(
                    code.canonical(),
                    format!("quote {quote} is not positive"),
                ));
            }
        }
        target_quote
            .checked_div(source_quote)
            .and_then(Self::new)
            .ok_or_else(|| {
                CurrencyConversionError::invalid_quote(
                    target.canonical(),
                    format!("cross rate against {} is out of range", source.canonical()),
                )
            })
    }

    /// The multiplier.
    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }
}

/// Port for looking up exchange rates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Rate converting one unit of `source` into `target`.
    async fn rate(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<ExchangeRate, CurrencyConversionError>;
}
