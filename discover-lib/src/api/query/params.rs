//! Query string generation for page requests.

use url::Url;

use crate::model::ColumnId;
use crate::view::QueryKey;
use crate::view::SortEntry;
use crate::view::ViewState;

/// Everything the endpoint needs to serve one page.
///
/// Built deterministically from a page cursor and the query-relevant part of
/// the view state. Only the first sort entry is sent; the endpoint supports a
/// single sort column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
    pub sort: Option<SortEntry>,
    pub search: Option<String>,
    /// Active column filters in [`ColumnId`] order.
    pub filters: Vec<(ColumnId, String)>,
}

impl PageRequest {
    /// Builds a request from a query key.
    pub fn new(page: usize, limit: usize, key: &QueryKey) -> Self {
        let search = if key.global_filter.is_empty() {
            None
        } else {
            Some(key.global_filter.clone())
        };

        Self {
            page,
            limit,
            sort: key.sorting.first().copied(),
            search,
            filters: key
                .column_filters
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(id, value)| (*id, value.clone()))
                .collect(),
        }
    }

    /// Builds a request from the current view state.
    pub fn from_view(page: usize, limit: usize, state: &ViewState) -> Self {
        Self::new(page, limit, &state.query_key())
    }

    /// Returns the query parameters in wire order.
    ///
    /// `page` and `limit` always come first, then `sortBy`/`order`, then
    /// `search`, then one parameter per column filter.
    pub fn query_pairs(&self) -> Vec<(&str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];

        if let Some(sort) = &self.sort {
            pairs.push(("sortBy", sort.column.as_str().to_string()));
            pairs.push(("order", sort.order().to_string()));
        }

        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }

        for (column, value) in &self.filters {
            pairs.push((column.as_str(), value.clone()));
        }

        pairs
    }

    /// Appends the query parameters to `base`.
    ///
    /// Existing query parameters on `base` are kept.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in self.query_pairs() {
                query.append_pair(name, &value);
            }
        }
        url
    }
}
