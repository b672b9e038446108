//! Page-number pagination primitives shared by Fieldcrew list endpoints.
//!
//! Pages are 1-indexed. Requesting a page past the end of a collection yields
//! an empty page rather than an error, so clients can walk pages until they
//! run dry. Slicing never reorders its input: for the same collection and
//! request the output is identical on every call.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(2, 2).expect("valid request");
//! let page = Page::slice(vec!["a", "b", "c", "d", "e"], request);
//! assert_eq!(page.items(), &["c", "d"]);
//! assert_eq!(page.page_count(), 3);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

mod envelope;

pub use envelope::{Paginated, PaginationLinks};

/// Page size applied when a request does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size accepted by [`PageRequest::new`].
pub const MAX_PAGE_SIZE: usize = 100;

/// Query parameter carrying the 1-indexed page number.
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the page size.
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// A page size of zero cannot produce a page.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// The page size exceeds the configured ceiling.
    #[error("page size {requested} exceeds the maximum of {max}")]
    PageSizeTooLarge {
        /// Page size supplied by the caller.
        requested: usize,
        /// Ceiling in force for the request.
        max: usize,
    },
}

/// A validated request for one page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request bounded by [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    /// Returns [`PaginationError`] when `page_size` is zero or too large.
    pub const fn new(page: usize, page_size: usize) -> Result<Self, PaginationError> {
        Self::with_max_page_size(page, page_size, MAX_PAGE_SIZE)
    }

    /// Build a request bounded by a caller-supplied ceiling.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when `page_size` is zero or exceeds `max`.
    pub const fn with_max_page_size(
        page: usize,
        page_size: usize,
        max: usize,
    ) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        if page_size > max {
            return Err(PaginationError::PageSizeTooLarge {
                requested: page_size,
                max,
            });
        }
        Ok(Self { page, page_size })
    }

    /// The requested 1-indexed page number.
    #[must_use]
    pub const fn page(self) -> usize {
        self.page
    }

    /// The requested page size.
    #[must_use]
    pub const fn page_size(self) -> usize {
        self.page_size
    }

    /// Index of the first item on the page, saturating on overflow.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Number of pages needed to show `total` items, `ceil(total / page_size)`.
///
/// ```
/// assert_eq!(pagination::page_count(21, 10), 3);
/// assert_eq!(pagination::page_count(0, 10), 0);
/// ```
#[must_use]
pub const fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Return the items on the requested page, preserving input order.
///
/// Page `0` and pages beyond the last one produce an empty vector.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Vec<T> {
    if request.page() == 0 {
        return Vec::new();
    }
    items
        .iter()
        .skip(request.offset())
        .take(request.page_size())
        .cloned()
        .collect()
}

/// One page of items together with the collection totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: usize,
    page_size: usize,
    total: usize,
}

impl<T> Page<T> {
    /// Slice an owned collection into the requested page.
    #[must_use]
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let selected = if request.page() == 0 {
            Vec::new()
        } else {
            items
                .into_iter()
                .skip(request.offset())
                .take(request.page_size())
                .collect()
        };
        Self {
            items: selected,
            page: request.page(),
            page_size: request.page_size(),
            total,
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.items.as_slice()
    }

    /// 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Page size used to slice the collection.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Size of the whole collection before slicing.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of pages in the whole collection.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    /// Transform every item while keeping the totals.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Wrap the page in a response envelope with navigation links derived
    /// from the request URL.
    #[must_use]
    pub fn into_envelope(self, request_url: &Url) -> Paginated<T> {
        Paginated::from_page(self, request_url)
    }
}
