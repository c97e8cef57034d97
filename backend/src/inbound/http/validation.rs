//! Shared validation helpers for inbound HTTP adapters.
//!
//! Query parameters are decoded leniently (signed integers, optional strings)
//! and checked here so every violation is reported in the same field-map shape
//! the domain constructors produce.

use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageWindow};

use crate::domain::{CurrencyCode, Error, FieldErrors};

/// Box size applied when a caller does not supply `quantity`.
pub(crate) const DEFAULT_BOX_QUANTITY: u32 = 6;

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const START: FieldName = FieldName::new("start");
pub(crate) const PAGE_SIZE: FieldName = FieldName::new("pageSize");
pub(crate) const QUANTITY: FieldName = FieldName::new("quantity");
pub(crate) const CURRENCY: FieldName = FieldName::new("currency");

/// Accumulates field violations so one response reports all of them.
#[derive(Debug, Default)]
struct Violations(FieldErrors);

impl Violations {
    fn record(&mut self, field: FieldName, rule: impl Into<String>) {
        self.0.insert(field.as_str().to_owned(), rule.into());
    }

    fn finish<T>(self, value: T) -> Result<T, Error> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(Error::validation(self.0))
        }
    }
}

/// Build a page window from raw `start` and `pageSize` parameters.
///
/// `start` defaults to 0 and must not be negative. `pageSize` defaults to
/// [`DEFAULT_PAGE_SIZE`] and must lie in `1..=MAX_PAGE_SIZE`.
pub(crate) fn parse_page_window(
    start: Option<i64>,
    page_size: Option<i64>,
) -> Result<PageWindow, Error> {
    let mut violations = Violations::default();

    let start = u64::try_from(start.unwrap_or(0)).unwrap_or_else(|_| {
        violations.record(START, "min=0");
        0
    });
    let page_size = match page_size {
        None => DEFAULT_PAGE_SIZE,
        Some(raw) => match u64::try_from(raw) {
            Ok(size) if size >= 1 && size <= MAX_PAGE_SIZE => size,
            Ok(size) if size > MAX_PAGE_SIZE => {
                violations.record(PAGE_SIZE, format!("max={MAX_PAGE_SIZE}"));
                DEFAULT_PAGE_SIZE
            }
            _ => {
                violations.record(PAGE_SIZE, "min=1");
                DEFAULT_PAGE_SIZE
            }
        },
    };

    let window = PageWindow::bounded(start, page_size)
        .map_err(|err| Error::invalid_field(PAGE_SIZE.as_str(), err.to_string()))?;
    violations.finish(window)
}

/// Box quantity from the raw `quantity` parameter; at least 1.
pub(crate) fn parse_quantity(quantity: Option<i64>) -> Result<u32, Error> {
    let Some(raw) = quantity else {
        return Ok(DEFAULT_BOX_QUANTITY);
    };
    let mut violations = Violations::default();
    let quantity = match u32::try_from(raw) {
        Ok(value) if value >= 1 => value,
        Ok(_) => {
            violations.record(QUANTITY, "min=1");
            0
        }
        Err(_) if raw > 0 => {
            violations.record(QUANTITY, format!("max={}", u32::MAX));
            0
        }
        Err(_) => {
            violations.record(QUANTITY, "min=1");
            0
        }
    };
    violations.finish(quantity)
}

/// Target currency from the raw `currency` parameter; blank means native.
pub(crate) fn parse_target_currency(currency: Option<&str>) -> Result<Option<CurrencyCode>, Error> {
    let Some(raw) = currency.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };
    CurrencyCode::parse(raw.trim())
        .map(Some)
        .map_err(|err| Error::invalid_field(CURRENCY.as_str(), err.rule()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn rule_for(error: &Error, field: &str) -> Option<String> {
        error
            .field_errors()
            .and_then(|fields| fields.get(field).cloned())
    }

    #[rstest]
    #[case::defaults(None, None, 0, 50)]
    #[case::explicit(Some(20), Some(10), 20, 10)]
    #[case::largest(Some(0), Some(100), 0, 100)]
    fn builds_windows(
        #[case] start: Option<i64>,
        #[case] page_size: Option<i64>,
        #[case] expected_start: u64,
        #[case] expected_size: u64,
    ) {
        let window = parse_page_window(start, page_size).expect("valid window");
        assert_eq!(window, PageWindow::new(expected_start, expected_size));
    }

    #[rstest]
    #[case::zero_size(None, Some(0), "pageSize", "min=1")]
    #[case::negative_size(None, Some(-4), "pageSize", "min=1")]
    #[case::oversized(None, Some(101), "pageSize", "max=100")]
    #[case::negative_start(Some(-1), None, "start", "min=0")]
    fn rejects_out_of_range_windows(
        #[case] start: Option<i64>,
        #[case] page_size: Option<i64>,
        #[case] field: &str,
        #[case] rule: &str,
    ) {
        let error = parse_page_window(start, page_size).expect_err("invalid window");
        assert_eq!(rule_for(&error, field).as_deref(), Some(rule));
    }

    #[rstest]
    fn reports_every_window_violation_at_once() {
        let error = parse_page_window(Some(-1), Some(0)).expect_err("invalid window");
        let fields = error.field_errors().expect("field map");
        assert_eq!(fields.len(), 2);
    }

    #[rstest]
    #[case::default(None, 6)]
    #[case::single(Some(1), 1)]
    #[case::crate_of_24(Some(24), 24)]
    fn accepts_quantities(#[case] raw: Option<i64>, #[case] expected: u32) {
        assert_eq!(parse_quantity(raw), Ok(expected));
    }

    #[rstest]
    #[case::zero(0, "min=1")]
    #[case::negative(-6, "min=1")]
    #[case::huge(i64::MAX, "max=4294967295")]
    fn rejects_quantities(#[case] raw: i64, #[case] rule: &str) {
        let error = parse_quantity(Some(raw)).expect_err("invalid quantity");
        assert_eq!(rule_for(&error, "quantity").as_deref(), Some(rule));
    }

    #[rstest]
    #[case::absent(None)]
    #[case::blank(Some(""))]
    #[case::spaces(Some("   "))]
    fn blank_currency_means_native(#[case] raw: Option<&str>) {
        assert_eq!(parse_target_currency(raw), Ok(None));
    }

    #[rstest]
    fn currency_is_trimmed_but_keeps_its_case() {
        let parsed = parse_target_currency(Some(" eur "))
            .expect("valid currency")
            .expect("target currency");
        assert_eq!(parsed.as_str(), "eur");
        assert_eq!(parsed.canonical(), "EUR");
    }

    #[rstest]
    #[case::digits("EU1", "alpha")]
    #[case::too_long("EUROPE", "max=5")]
    fn rejects_bad_currencies(#[case] raw: &str, #[case] rule: &str) {
        let error = parse_target_currency(Some(raw)).expect_err("invalid currency");
        assert_eq!(rule_for(&error, "currency").as_deref(), Some(rule));
    }
}
