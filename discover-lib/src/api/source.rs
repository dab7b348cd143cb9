//! Page source abstraction

use async_trait::async_trait;

use super::query::Page;
use super::query::PageRequest;
use crate::error::FetchError;

/// Anything that can serve one page for a request.
///
/// [`DiscoverClient`](crate::DiscoverClient) is the HTTP implementation.
/// Implementations perform exactly one remote call per `fetch` and do no
/// caching of their own; caching belongs to
/// [`PaginationCache`](crate::cache::PaginationCache).
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches a single page.
    async fn fetch(&self, request: &PageRequest) -> Result<Page, FetchError>;
}
