//! Offset pagination primitives for catalog listings.
//!
//! A [`PageWindow`] describes which slice of an ordered match set a caller
//! wants: skip `start` matches, then return at most `page_size` of them.
//! Repositories accept any window, including oversized ones; callers that
//! face the network build windows through [`PageWindow::bounded`] so the
//! public API enforces [`MAX_PAGE_SIZE`].
//!
//! [`Page`] is the envelope returned to clients. It carries the window that
//! produced it alongside the total match count so clients can compute the
//! next offset without a second request.

use serde::{Deserialize, Serialize};

/// Page size applied when a caller does not request one.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Largest page size accepted by [`PageWindow::bounded`].
pub const MAX_PAGE_SIZE: u64 = 100;

/// Errors raised when a requested window violates the public bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageWindowError {
    /// A page size of zero was requested.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// The requested page size exceeds [`MAX_PAGE_SIZE`].
    #[error("page size {requested} exceeds the maximum of {max}")]
    PageSizeTooLarge {
        /// Page size supplied by the caller.
        requested: u64,
        /// Largest accepted page size.
        max: u64,
    },
}

/// Offset and length of a requested page.
///
/// # Examples
/// ```
/// use pagination::PageWindow;
///
/// let window = PageWindow::new(10, 5);
/// assert_eq!(window.expected_len(12), 2);
/// assert_eq!(window.expected_len(8), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    start: u64,
    page_size: u64,
}

impl PageWindow {
    /// Build a window without applying the public page size bounds.
    #[must_use]
    pub const fn new(start: u64, page_size: u64) -> Self {
        Self { start, page_size }
    }

    /// Build a window for untrusted input.
    ///
    /// # Errors
    ///
    /// Returns [`PageWindowError::ZeroPageSize`] for a zero page size and
    /// [`PageWindowError::PageSizeTooLarge`] above [`MAX_PAGE_SIZE`].
    pub const fn bounded(start: u64, page_size: u64) -> Result<Self, PageWindowError> {
        if page_size == 0 {
            return Err(PageWindowError::ZeroPageSize);
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(PageWindowError::PageSizeTooLarge {
                requested: page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self::new(start, page_size))
    }

    /// Number of leading matches to skip.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Maximum number of matches to return.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Length of the page this window yields over `total` matches.
    #[must_use]
    pub const fn expected_len(&self, total: u64) -> u64 {
        let remaining = total.saturating_sub(self.start);
        if remaining < self.page_size {
            remaining
        } else {
            self.page_size
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// A page of results plus the window and total that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Offset of the first item in `data`.
    pub start: u64,
    /// Page size requested by the caller.
    pub page_size: u64,
    /// Number of matches across all pages.
    pub total: u64,
    /// Items on this page.
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from its window, total and items.
    #[must_use]
    pub const fn new(window: PageWindow, total: u64, data: Vec<T>) -> Self {
        Self {
            start: window.start(),
            page_size: window.page_size(),
            total,
            data,
        }
    }

    /// Convert every item while keeping the envelope.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            start: self.start,
            page_size: self.page_size,
            total: self.total,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
