//! Beer entity and its validated constructors.
//!
//! Purpose: define the only document type the catalog stores. A beer is built
//! in two steps: [`NewBeer::try_from`] checks a caller-supplied [`BeerDraft`]
//! field by field, then [`NewBeer::stamp`] attaches creation metadata. Stored
//! beers are re-validated on decode so a malformed document never reaches a
//! handler.
//!
//! Field limits:
//! - `id`: non-zero
//! - `name`, `brewery`: 1 to [`MAX_NAME_LEN`] / [`MAX_BREWERY_LEN`] characters
//! - `country`: 1 to [`MAX_COUNTRY_LEN`] characters
//! - `price`: required, non-negative
//! - `currency`: 1 to [`MAX_CURRENCY_LEN`] ASCII letters
//!
//! Accepted values are stored exactly as supplied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::{AuditStamp, Document, DocumentId};
use super::error::{Error, FieldErrors};

/// Collection holding beer documents.
pub const BEER_COLLECTION: &str = "beers";
/// Maximum beer name length in characters.
pub const MAX_NAME_LEN: usize = 30;
/// Maximum brewery name length in characters.
pub const MAX_BREWERY_LEN: usize = 30;
/// Maximum country name length in characters.
pub const MAX_COUNTRY_LEN: usize = 20;
/// Maximum currency code length in characters.
pub const MAX_CURRENCY_LEN: usize = 5;

/// Currency code such as `USD`, kept in the letter case it was given.
///
/// Equality is exact; use [`CurrencyCode::is_same_as`] to compare codes the
/// way rate providers do.
///
/// # Examples
/// ```
/// use beer_catalog::domain::CurrencyCode;
///
/// let code = CurrencyCode::parse("eur").expect("valid code");
/// assert_eq!(code.as_str(), "eur");
/// assert_eq!(code.canonical(), "EUR");
/// assert!(code.is_same_as(&CurrencyCode::parse("EUR").expect("valid code")));
/// assert!(CurrencyCode::parse("EURO12").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

/// Reasons a currency code is rejected. Each maps to a validation rule tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CurrencyCodeError {
    /// The code was blank.
    #[error("currency code is required")]
    Empty,
    /// The code exceeded [`MAX_CURRENCY_LEN`] characters.
    #[error("currency code must be at most {MAX_CURRENCY_LEN} characters")]
    TooLong,
    /// The code contained something other than ASCII letters.
    #[error("currency code must contain only ASCII letters")]
    NotAlphabetic,
}

impl CurrencyCodeError {
    /// Rule tag reported in validation field maps.
    #[must_use]
    pub fn rule(self) -> String {
        match self {
            Self::Empty => "required".to_owned(),
            Self::TooLong => format!("max={MAX_CURRENCY_LEN}"),
            Self::NotAlphabetic => "alpha".to_owned(),
        }
    }
}

impl CurrencyCode {
    /// Validate a currency code without rewriting it.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyCodeError`] when the code is blank, too long, or
    /// contains non-letters.
    pub fn parse(raw: &str) -> Result<Self, CurrencyCodeError> {
        if raw.trim().is_empty() {
            return Err(CurrencyCodeError::Empty);
        }
        if raw.chars().count() > MAX_CURRENCY_LEN {
            return Err(CurrencyCodeError::TooLong);
        }
        if !raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyCodeError::NotAlphabetic);
        }
        Ok(Self(raw.to_owned()))
    }

    /// The code as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-case form used to look up exchange quotes.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.0.to_ascii_uppercase()
    }

    /// Whether both codes name the same currency, ignoring letter case.
    #[must_use]
    pub fn is_same_as(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated beer fields as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeerDraft {
    /// Caller-chosen identifier.
    pub id: DocumentId,
    /// Beer name.
    pub name: String,
    /// Brewery name.
    pub brewery: String,
    /// Country of origin.
    pub country: String,
    /// Unit price in `currency`; `None` when the caller omitted it.
    pub price: Option<Decimal>,
    /// Currency the price is expressed in.
    pub currency: String,
}

/// Field-level failures found while validating a [`BeerDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid beer: {fields:?}")]
pub struct BeerValidationError {
    /// Field name to violated rule.
    pub fields: FieldErrors,
}

impl From<BeerValidationError> for Error {
    fn from(value: BeerValidationError) -> Self {
        Self::validation(value.fields)
    }
}

/// A validated beer awaiting creation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBeer {
    id: DocumentId,
    name: String,
    brewery: String,
    country: String,
    price: Decimal,
    currency: CurrencyCode,
}

fn check_text(fields: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        fields.insert(field.to_owned(), "required".to_owned());
    } else if value.chars().count() > max {
        fields.insert(field.to_owned(), format!("max={max}"));
    }
}

impl TryFrom<BeerDraft> for NewBeer {
    type Error = BeerValidationError;

    fn try_from(draft: BeerDraft) -> Result<Self, Self::Error> {
        let mut fields = FieldErrors::new();

        if draft.id.get() == 0 {
            fields.insert("id".to_owned(), "required".to_owned());
        }
        check_text(&mut fields, "name", &draft.name, MAX_NAME_LEN);
        check_text(&mut fields, "brewery", &draft.brewery, MAX_BREWERY_LEN);
        check_text(&mut fields, "country", &draft.country, MAX_COUNTRY_LEN);

        let price = match draft.price {
            None => {
                fields.insert("price".to_owned(), "required".to_owned());
                None
            }
            Some(price) if price.is_sign_negative() && !price.is_zero() => {
                fields.insert("price".to_owned(), "min=0".to_owned());
                None
            }
            Some(price) => Some(price),
        };

        let currency = CurrencyCode::parse(&draft.currency)
            .map_err(|err| fields.insert("currency".to_owned(), err.rule()))
            .ok();

        match (price, currency) {
            (Some(price), Some(currency)) if fields.is_empty() => Ok(Self {
                id: draft.id,
                name: draft.name,
                brewery: draft.brewery,
                country: draft.country,
                price,
                currency,
            }),
            _ => Err(BeerValidationError { fields }),
        }
    }
}

impl NewBeer {
    /// Identifier the beer will be stored under.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Attach creation metadata, producing a storable beer.
    #[must_use]
    pub fn stamp(self, audit: AuditStamp) -> Beer {
        Beer {
            id: self.id,
            name: self.name,
            brewery: self.brewery,
            country: self.country,
            price: self.price,
            currency: self.currency,
            audit,
        }
    }
}

/// A catalogued beer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BeerRecord", into = "BeerRecord")]
pub struct Beer {
    id: DocumentId,
    name: String,
    brewery: String,
    country: String,
    price: Decimal,
    currency: CurrencyCode,
    audit: AuditStamp,
}

impl Beer {
    /// Beer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Brewery name.
    #[must_use]
    pub fn brewery(&self) -> &str {
        &self.brewery
    }

    /// Country of origin.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Unit price in [`Beer::currency`].
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Currency the price is expressed in.
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}

impl Document for Beer {
    const COLLECTION: &'static str = BEER_COLLECTION;

    fn id(&self) -> DocumentId {
        self.id
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }
}

/// Stored shape of a beer document.
///
/// The price is a JSON number so stores order and compare it numerically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BeerRecord {
    id: DocumentId,
    name: String,
    brewery: String,
    country: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    currency: String,
    #[serde(flatten)]
    audit: AuditStamp,
}

impl From<Beer> for BeerRecord {
    fn from(value: Beer) -> Self {
        Self {
            id: value.id,
            name: value.name,
            brewery: value.brewery,
            country: value.country,
            price: value.price,
            currency: value.currency.into(),
            audit: value.audit,
        }
    }
}

impl TryFrom<BeerRecord> for Beer {
    type Error = BeerValidationError;

    fn try_from(value: BeerRecord) -> Result<Self, Self::Error> {
        let new_beer = NewBeer::try_from(BeerDraft {
            id: value.id,
            name: value.name,
            brewery: value.brewery,
            country: value.country,
            price: Some(value.price),
            currency: value.currency,
        })?;
        Ok(new_beer.stamp(value.audit))
    }
}
