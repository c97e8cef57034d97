//! Domain primitives, aggregates and services for the beer catalog.
//!
//! Purpose: define the strongly typed catalog entities used by the HTTP and
//! persistence layers, plus the services implementing the driving ports.
//! Types keep their invariants behind constructors; serde contracts are
//! documented on each type.
//!
//! Public surface:
//! - Beer, NewBeer and BeerDraft: a catalogued beer and its creation stages.
//! - Document and DocumentId: what a document repository can store.
//! - Error and ErrorCode: the failure taxonomy shared by every layer.
//! - BeerCommandService and BeerQueryService: port implementations.

pub mod beer;
mod beer_service;
pub mod document;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::beer::{
    BEER_COLLECTION, Beer, BeerDraft, BeerValidationError, CurrencyCode, CurrencyCodeError,
    MAX_BREWERY_LEN, MAX_COUNTRY_LEN, MAX_CURRENCY_LEN, MAX_NAME_LEN, NewBeer,
};
pub use self::beer_service::{BeerCommandService, BeerQueryService, CATALOG_CREATOR};
pub use self::document::{AuditStamp, Document, DocumentId};
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldErrors};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use beer_catalog::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("no such beer"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
