//! JSON envelope wrapping one page with totals and navigation links.

use serde::Serialize;
use url::Url;

use crate::{PAGE_PARAM, PAGE_SIZE_PARAM, Page};

/// Navigation links for a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub self_: String,
    /// Link to the following page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the preceding page, absent on the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// Response body returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on the current page.
    pub data: Vec<T>,
    /// 1-indexed page number.
    pub page: usize,
    /// Page size used to slice the collection.
    pub page_size: usize,
    /// Size of the whole collection.
    pub total: usize,
    /// Number of pages in the whole collection.
    pub page_count: usize,
    /// Navigation links.
    pub links: PaginationLinks,
}

impl<T> Paginated<T> {
    /// Build an envelope from a page, deriving links from `request_url`.
    ///
    /// Query parameters other than the paging ones are preserved, so filters
    /// carry through to the `next` and `prev` links.
    #[must_use]
    pub fn from_page(page: Page<T>, request_url: &Url) -> Self {
        let number = page.page();
        let page_size = page.page_size();
        let total = page.total();
        let page_count = page.page_count();

        let next = (number < page_count)
            .then(|| page_link(request_url, number.saturating_add(1), page_size));
        let prev = (number > 1 && page_count > 0)
            .then(|| page_link(request_url, number.saturating_sub(1).min(page_count), page_size));

        Self {
            data: page.into_items(),
            page: number,
            page_size,
            total,
            page_count,
            links: PaginationLinks {
                self_: page_link(request_url, number, page_size),
                next,
                prev,
            },
        }
    }
}

fn page_link(base: &Url, page: usize, page_size: usize) -> String {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM && key != PAGE_SIZE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
        pairs.append_pair(PAGE_SIZE_PARAM, &page_size.to_string());
    }
    url.to_string()
}
