//! Rate-limited HTTP access to the AniSearch catalog.
//!
//! Every outbound request goes through [`RemoteCatalogClient`], which owns a
//! single-permit [`Semaphore`]. No matter how many metadata, search, or image
//! lookups run concurrently, at most one request is in flight against the
//! catalog at any time.
//!
//! The network itself sits behind the [`Transport`] trait. [`HttpTransport`]
//! is the reqwest-backed implementation used in production.

use std::sync::Arc;
use std::time::Duration;

use anisearch_common::{CatalogId, Error, Result};
use async_trait::async_trait;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::extract::PageExtractor;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default catalog root.
pub const ANISEARCH_BASE_URL: &str = "https://www.anisearch.com/";

/// Maximum number of concurrent requests to the catalog.
pub const MAX_IN_FLIGHT: usize = 1;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Raw response returned by a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw binary response, used for image downloads.
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, when the transport reports one.
    pub content_type: Option<String>,
    /// Undecoded response body.
    pub body: Vec<u8>,
}

impl BinaryResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single GET. Retries, if any, are the transport's business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url`.
    ///
    /// Network errors and timeouts map to [`Error::FetchFailed`]. Non-2xx
    /// statuses are returned as a normal response.
    async fn get(&self, url: &str) -> Result<TransportResponse>;

    /// Issue a GET for `url` and keep the body as raw bytes.
    async fn get_bytes(&self, url: &str) -> Result<BinaryResponse> {
        let resp = self.get(url).await?;
        Ok(BinaryResponse {
            status: resp.status,
            content_type: None,
            body: resp.body.into_bytes(),
        })
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch_failed(url, e))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| Error::fetch_failed(url, e))?;

        Ok(TransportResponse { status, body })
    }

    async fn get_bytes(&self, url: &str) -> Result<BinaryResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch_failed(url, e))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await.map_err(|e| Error::fetch_failed(url, e))?;

        Ok(BinaryResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the AniSearch catalog.
///
/// Cheap to share behind an `Arc`; all clones of that `Arc` serialize on the
/// same limiter. Use [`with_limiter`](Self::with_limiter) to make several
/// clients share one limiter.
pub struct RemoteCatalogClient {
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn PageExtractor>,
    limiter: Arc<Semaphore>,
    base_url: String,
}

impl RemoteCatalogClient {
    /// Create a client with its own single-permit limiter.
    pub fn new(
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn PageExtractor>,
        base_url: &str,
    ) -> Self {
        Self::with_limiter(
            transport,
            extractor,
            base_url,
            Arc::new(Semaphore::new(MAX_IN_FLIGHT)),
        )
    }

    /// Create a client that gates requests on an existing limiter.
    pub fn with_limiter(
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn PageExtractor>,
        base_url: &str,
        limiter: Arc<Semaphore>,
    ) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            transport,
            extractor,
            limiter,
            base_url,
        }
    }

    /// The limiter gating this client's requests.
    pub fn limiter(&self) -> &Arc<Semaphore> {
        &self.limiter
    }

    /// The extractor used to parse pages fetched by this client.
    pub fn extractor(&self) -> &dyn PageExtractor {
        self.extractor.as_ref()
    }

    /// Build an absolute URL for a catalog-relative path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetch a catalog-relative path and return its body.
    pub async fn fetch(&self, path: &str, cancel: &CancellationToken) -> Result<String> {
        let url = self.url(path);
        self.get(&url, cancel).await
    }

    /// Fetch the detail page for `id`.
    pub async fn fetch_detail(&self, id: &CatalogId, cancel: &CancellationToken) -> Result<String> {
        self.fetch(&detail_path(id), cancel).await
    }

    /// Query the catalog's search page and return matching ids in page order.
    pub async fn search_ids(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogId>> {
        let body = self.fetch(&search_path(title), cancel).await?;
        let ids = self.extractor.search_ids(&body);
        debug!(title, hits = ids.len(), "AniSearch search");
        Ok(ids)
    }

    /// Download an absolute URL, typically a cover image, under the shared
    /// limiter.
    ///
    /// The response is returned whatever its status; only network failures
    /// and cancellation are errors.
    pub async fn fetch_bytes(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<BinaryResponse> {
        let _permit = self.acquire(url, cancel).await?;

        debug!(url, "AniSearch download");

        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            resp = self.transport.get_bytes(url) => resp?,
        };

        if !resp.is_success() {
            warn!(url, status = resp.status, "AniSearch download returned an error status");
        }

        Ok(resp)
    }

    /// Wait for the limiter's permit, giving up on cancellation.
    ///
    /// The returned guard releases the permit when dropped.
    async fn acquire(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<SemaphorePermit<'_>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            permit = self.limiter.acquire() => {
                permit.map_err(|_| Error::fetch_failed(url, "request limiter closed"))
            }
        }
    }

    /// Issue a GET for an absolute URL under the shared limiter.
    ///
    /// The permit is held for the duration of the request and released when
    /// this function returns, whether it succeeded, failed, or was cancelled.
    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        let _permit = self.acquire(url, cancel).await?;

        debug!(url, "AniSearch request");

        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            resp = self.transport.get(url) => resp?,
        };

        if !resp.is_success() {
            warn!(url, status = resp.status, "AniSearch returned an error status");
            return Err(Error::fetch_failed(url, format!("HTTP {}", resp.status)));
        }

        Ok(resp.body)
    }
}

/// Path of the detail page for an entry.
fn detail_path(id: &CatalogId) -> String {
    format!("anime/{}", urlencoding::encode(id.as_str()))
}

/// Path of the search page for a title.
fn search_path(title: &str) -> String {
    format!("anime/index?text={}&smode=1", urlencoding::encode(title))
}
