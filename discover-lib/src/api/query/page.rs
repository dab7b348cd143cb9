//! Page type for paginated results.

use serde::Deserialize;

use crate::model::Row;

/// One page of results as served by the endpoint.
///
/// `count` is the total number of rows matching the query on the server, not
/// the number of rows in this page. A page is never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page {
    items: Vec<Row>,
    count: usize,
}

impl Page {
    /// Creates a page from rows and the server-side total.
    pub fn new(items: Vec<Row>, count: usize) -> Self {
        Self { items, count }
    }

    /// Returns the rows in this page.
    pub fn items(&self) -> &[Row] {
        &self.items
    }

    /// Returns the total row count reported by the server.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
