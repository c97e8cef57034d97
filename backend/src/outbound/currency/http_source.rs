//! Reqwest-backed currencylayer converter.
//!
//! This adapter owns transport details only: request construction, timeout
//! and HTTP error mapping, and decoding quotes into exchange rates. The access
//! key travels in the query string, so transport errors are stripped of their
//! URL before they are reported.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::LiveQuotesDto;
use crate::domain::CurrencyCode;
use crate::domain::ports::{CurrencyConversionError, CurrencyConverter, ExchangeRate};

/// Public currencylayer endpoint.
pub const DEFAULT_CURRENCY_ENDPOINT: &str = "http://api.currencylayer.com";

const LIVE_PATH: &str = "live";

/// Converter that asks currencylayer for live quotes on every lookup.
pub struct CurrencyLayerConverter {
    client: Client,
    live_url: Url,
    access_key: String,
}

impl CurrencyLayerConverter {
    /// Build a converter for `endpoint` using a reqwest client with an
    /// explicit request timeout.
    /// ```rust,ignore
    /// let endpoint = Url::parse(DEFAULT_CURRENCY_ENDPOINT)?;
    /// let converter = CurrencyLayerConverter::new(endpoint, "key", Duration::from_secs(10))?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// endpoint cannot carry a path.
    pub fn new(
        endpoint: Url,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CurrencyConversionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CurrencyConversionError::transport(err.to_string()))?;
        Ok(Self {
            client,
            live_url: live_url(endpoint)?,
            access_key: access_key.into(),
        })
    }
}

fn live_url(mut endpoint: Url) -> Result<Url, CurrencyConversionError> {
    endpoint
        .path_segments_mut()
        .map_err(|()| {
            CurrencyConversionError::transport("currency endpoint cannot be a base URL")
        })?
        .pop_if_empty()
        .push(LIVE_PATH);
    Ok(endpoint)
}

#[async_trait]
impl CurrencyConverter for CurrencyLayerConverter {
    async fn rate(
        &self,
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<ExchangeRate, CurrencyConversionError> {
        if source.is_same_as(target) {
            return Ok(ExchangeRate::IDENTITY);
        }

        let currencies = format!("{},{}", source.canonical(), target.canonical());
        let response = self
            .client
            .get(self.live_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("currencies", currencies.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let rate = parse_rate(body.as_ref(), source, target)?;
        debug!(%source, %target, rate = %rate.value(), "fetched exchange rate");
        Ok(rate)
    }
}

fn parse_rate(
    body: &[u8],
    source: &CurrencyCode,
    target: &CurrencyCode,
) -> Result<ExchangeRate, CurrencyConversionError> {
    let decoded: LiveQuotesDto = serde_json::from_slice(body).map_err(|error| {
        CurrencyConversionError::decode(format!("invalid currency JSON payload: {error}"))
    })?;
    decoded.ensure_success()?;
    let source_quote = decoded.quote(source)?;
    let target_quote = decoded.quote(target)?;
    ExchangeRate::cross(source, source_quote, target, target_quote)
}

fn map_transport_error(error: reqwest::Error) -> CurrencyConversionError {
    let error = error.without_url();
    if error.is_timeout() {
        CurrencyConversionError::timeout(error.to_string())
    } else {
        CurrencyConversionError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CurrencyConversionError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CurrencyConversionError::timeout(message)
        }
        _ => CurrencyConversionError::upstream(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
