//! HTTP client for the paginated endpoint

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use log::warn;
use reqwest::Client;
use url::Url;

use crate::api::PageSource;
use crate::api::query::Page;
use crate::api::query::PageRequest;
use crate::error::FetchError;
use crate::view::ViewState;

/// Fetches pages from the remote data source.
///
/// Cheap to clone (uses `Arc` internally), so a host can hand a copy to every
/// spawned fetch. Holds no cache: every call is exactly one GET.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use discover_lib::DiscoverClient;
/// use discover_lib::view::ViewState;
///
/// let client = DiscoverClient::builder()
///     .url("https://6396e71c77359127a025f847.mockapi.io/dw/users")
///     .timeout(Duration::from_secs(15))
///     .build()?;
///
/// let page = client.fetch_page(0, 10, &ViewState::default()).await?;
/// println!("{} of {}", page.len(), page.count());
/// ```
#[derive(Clone)]
pub struct DiscoverClient {
    inner: Arc<DiscoverClientInner>,
}

struct DiscoverClientInner {
    endpoint: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl DiscoverClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> DiscoverClientBuilder<Missing> {
        DiscoverClientBuilder::new()
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Fetches one page under the query described by `state`.
    pub async fn fetch_page(
        &self,
        page_index: usize,
        page_size: usize,
        state: &ViewState,
    ) -> Result<Page, FetchError> {
        let request = PageRequest::from_view(page_index, page_size, state);
        self.fetch(&request).await
    }

    async fn get(&self, request: &PageRequest) -> Result<Page, FetchError> {
        let url = request.to_url(&self.inner.endpoint);
        debug!("GET {}", url);

        let mut builder = self.inner.http_client.get(url);
        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("").to_string()
            } else {
                body
            };
            return Err(FetchError::http(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::parse_with_body(e.to_string(), body))
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        match self.inner.timeout {
            Some(timeout) if error.is_timeout() => FetchError::Timeout(timeout),
            _ => FetchError::Network(error),
        }
    }
}

#[async_trait]
impl PageSource for DiscoverClient {
    async fn fetch(&self, request: &PageRequest) -> Result<Page, FetchError> {
        let result = self.get(request).await;
        match &result {
            Ok(page) => debug!(
                "Page {} returned {} rows (count {})",
                request.page,
                page.len(),
                page.count()
            ),
            Err(e) => warn!("Page {} failed: {}", request.page, e),
        }
        result
    }
}

/// Marker type for a required builder field that has not been set.
#[derive(Debug, Clone, Copy)]
pub struct Missing;

/// Marker type for a required builder field that has been set.
#[derive(Debug, Clone)]
pub struct Set<T>(T);

/// Builder for [`DiscoverClient`].
///
/// The endpoint is required and enforced at compile time:
///
/// - `url` - The endpoint serving `{ items, count }` pages
///
/// Optional settings:
///
/// - `timeout` - Per-request timeout (surfaces as a network-class error)
/// - `connect_timeout` - Connection timeout for the default HTTP client
/// - `http_client` - A preconfigured `reqwest::Client`
pub struct DiscoverClientBuilder<U> {
    url: U,
    http_client: Option<Client>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl DiscoverClientBuilder<Missing> {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            url: Missing,
            http_client: None,
            timeout: None,
            connect_timeout: None,
        }
    }
}

impl Default for DiscoverClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoverClientBuilder<Missing> {
    /// Sets the endpoint URL.
    pub fn url(self, url: impl Into<String>) -> DiscoverClientBuilder<Set<String>> {
        DiscoverClientBuilder {
            url: Set(url.into()),
            http_client: self.http_client,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}

impl<U> DiscoverClientBuilder<U> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// Ignored when a custom HTTP client is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl DiscoverClientBuilder<Set<String>> {
    /// Builds the [`DiscoverClient`].
    ///
    /// Fails if the URL does not parse or the HTTP client cannot be created.
    pub fn build(self) -> Result<DiscoverClient, FetchError> {
        let endpoint = Url::parse(&self.url.0)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(DiscoverClient {
            inner: Arc::new(DiscoverClientInner {
                endpoint,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
