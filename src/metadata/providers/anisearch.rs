//! AniSearch provider facades.
//!
//! [`AniSearchSeriesProvider`] implements [`MetadataProvider`] on top of the
//! assembler and search aggregator. [`AniSearchImageProvider`] implements
//! [`ImageProvider`] by reading the cover URL off the detail page. Both
//! share one [`RemoteCatalogClient`], and therefore one request limiter.

use std::sync::Arc;
use std::time::Duration;

use anisearch_common::{CatalogId, Error, ImageType, ItemKind, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::ImageLocationCache;
use crate::client::{BinaryResponse, HttpTransport, RemoteCatalogClient};
use crate::config::Config;
use crate::extract::HtmlExtractor;
use crate::metadata::assembler::{store_image_url, MetadataAssembler};
use crate::metadata::provider::{
    CandidateResult, HasProviderIds, ImageProvider, MetadataProvider, MetadataRecord,
    RemoteImageInfo, SearchQuery, PROVIDER_NAME,
};
use crate::metadata::search::SearchAggregator;

/// Consultation order reported to hosts.
pub const PROVIDER_ORDER: i32 = -3;

/// Metadata provider for anime series listed on AniSearch.
///
/// # Examples
///
/// ```no_run
/// use anisearch::config::Config;
/// use anisearch::metadata::providers::build_providers;
///
/// let (series, images) = build_providers(&Config::default()).unwrap();
/// ```
pub struct AniSearchSeriesProvider {
    client: Arc<RemoteCatalogClient>,
    assembler: MetadataAssembler,
    aggregator: SearchAggregator,
}

impl AniSearchSeriesProvider {
    pub fn new(client: Arc<RemoteCatalogClient>, cache: Arc<ImageLocationCache>) -> Self {
        Self {
            assembler: MetadataAssembler::new(client.clone(), cache),
            aggregator: SearchAggregator::new(client.clone()),
            client,
        }
    }
}

#[async_trait]
impl MetadataProvider for AniSearchSeriesProvider {
    type Query = SearchQuery;
    type Record = MetadataRecord;
    type Candidate = CandidateResult;

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn order(&self) -> i32 {
        PROVIDER_ORDER
    }

    async fn get_metadata(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<MetadataRecord> {
        self.assembler.assemble(query, cancel).await
    }

    async fn get_search_results(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CandidateResult>> {
        self.aggregator.search(query, cancel).await
    }

    async fn get_image_response(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<BinaryResponse> {
        self.client.fetch_bytes(url, cancel).await
    }
}

/// Cover-image provider for AniSearch entries.
pub struct AniSearchImageProvider {
    client: Arc<RemoteCatalogClient>,
    cache: Arc<ImageLocationCache>,
}

impl AniSearchImageProvider {
    pub fn new(client: Arc<RemoteCatalogClient>, cache: Arc<ImageLocationCache>) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl ImageProvider for AniSearchImageProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports(&self, kind: ItemKind) -> bool {
        matches!(kind, ItemKind::Series | ItemKind::Season)
    }

    fn supported_images(&self, _kind: ItemKind) -> Vec<ImageType> {
        vec![ImageType::Primary]
    }

    /// Always fetches the detail page live; the image-location cache is only
    /// written here, never read.
    async fn get_images(
        &self,
        id: &CatalogId,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteImageInfo>> {
        let body = match self.client.fetch_detail(id, cancel).await {
            Ok(body) => body,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to fetch AniSearch page for images");
                return Ok(Vec::new());
            }
        };

        let url = self.client.extractor().image_url(&body);
        let url = url.trim();
        if url.is_empty() {
            debug!(id = %id, "AniSearch page has no cover image");
            return Ok(Vec::new());
        }

        store_image_url(&self.cache, id, url);

        Ok(vec![RemoteImageInfo {
            provider_name: PROVIDER_NAME.to_string(),
            image_type: ImageType::Primary,
            url: url.to_string(),
        }])
    }

    async fn get_images_for_item(
        &self,
        item: &(dyn HasProviderIds + Sync),
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteImageInfo>> {
        match CatalogId::from_optional(item.provider_id(PROVIDER_NAME)) {
            Some(id) => self.get_images(&id, cancel).await,
            None => Ok(Vec::new()),
        }
    }

    async fn get_image_response(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<BinaryResponse> {
        self.client.fetch_bytes(url, cancel).await
    }
}

/// Build both providers from configuration, sharing one client and cache.
pub fn build_providers(
    config: &Config,
) -> Result<(AniSearchSeriesProvider, AniSearchImageProvider)> {
    let transport = HttpTransport::new(
        Duration::from_secs(config.catalog.request_timeout_secs),
        &config.catalog.user_agent,
    )?;
    let extractor = HtmlExtractor::new()?;
    let client = Arc::new(RemoteCatalogClient::new(
        Arc::new(transport),
        Arc::new(extractor),
        &config.catalog.base_url,
    ));
    let cache = Arc::new(ImageLocationCache::new(config.cache.resolved_dir()));

    Ok((
        AniSearchSeriesProvider::new(client.clone(), cache.clone()),
        AniSearchImageProvider::new(client, cache),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{client_with, StubTransport};
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    fn providers(
        transport: &Arc<StubTransport>,
        root: std::path::PathBuf,
    ) -> (AniSearchSeriesProvider, AniSearchImageProvider) {
        let client = Arc::new(client_with(transport.clone()));
        let cache = Arc::new(ImageLocationCache::new(root));
        (
            AniSearchSeriesProvider::new(client.clone(), cache.clone()),
            AniSearchImageProvider::new(client, cache),
        )
    }

    #[test]
    fn host_integration_details() {
        let dir = tempfile::tempdir().unwrap();
        let (series, images) = providers(&Arc::new(StubTransport::new()), dir.path().into());

        assert_eq!(series.name(), "AniSearch");
        assert!(series.order() < 0);
        assert_eq!(images.name(), "AniSearch");
        assert!(images.supports(ItemKind::Series));
        assert!(images.supports(ItemKind::Season));
        assert!(!images.supports(ItemKind::Movie));
        assert_eq!(images.supported_images(ItemKind::Series), vec![ImageType::Primary]);
    }

    #[tokio::test]
    async fn get_images_returns_primary_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let transport =
            Arc::new(StubTransport::new().route("anime/5", 200, "image=https://cdn/5.webp"));
        let (_, images) = providers(&transport, dir.path().into());

        let found = images
            .get_images(&CatalogId::parse("5").unwrap(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            found,
            vec![RemoteImageInfo {
                provider_name: "AniSearch".into(),
                image_type: ImageType::Primary,
                url: "https://cdn/5.webp".into(),
            }]
        );
        let stored = std::fs::read_to_string(dir.path().join("anisearch/image/5.txt")).unwrap();
        assert_eq!(stored, "https://cdn/5.webp");
    }

    #[tokio::test]
    async fn get_images_for_item_without_id_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(StubTransport::new());
        let (_, images) = providers(&transport, dir.path().into());

        let item: HashMap<String, String> = HashMap::new();
        let found = images
            .get_images_for_item(&item, &CancellationToken::new())
            .await
            .unwrap();

        assert!(found.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn get_images_for_item_uses_stored_id() {
        let dir = tempfile::tempdir().unwrap();
        let transport =
            Arc::new(StubTransport::new().route("anime/8", 200, "image=https://cdn/8.webp"));
        let (_, images) = providers(&transport, dir.path().into());

        let query = SearchQuery::by_id("8");
        let found = images
            .get_images_for_item(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://cdn/8.webp");
    }

    #[tokio::test]
    async fn get_images_tolerates_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(StubTransport::new());
        let (_, images) = providers(&transport, dir.path().into());

        let found = images
            .get_images(&CatalogId::parse("404").unwrap(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn image_download_shares_limiter_with_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            StubTransport::new()
                .route("anime/1", 200, "title=One\nimage=https://cdn.test/1.webp")
                .route("cdn.test/1.webp", 200, "cover-bytes")
                .delay(std::time::Duration::from_millis(5)),
        );
        let (series, images) = providers(&transport, dir.path().into());
        let cancel = CancellationToken::new();
        let query = SearchQuery::by_id("1");

        let (record, from_images, from_series) = tokio::join!(
            series.get_metadata(&query, &cancel),
            images.get_image_response("https://cdn.test/1.webp", &cancel),
            series.get_image_response("https://cdn.test/1.webp", &cancel),
        );

        assert!(record.unwrap().has_metadata);
        let from_images = from_images.unwrap();
        assert_eq!(from_images.status, 200);
        assert_eq!(from_images.body, b"cover-bytes");
        assert_eq!(from_series.unwrap().body, b"cover-bytes");
        assert_eq!(transport.calls(), 3);
        assert_eq!(transport.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_image_download_returns_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(StubTransport::new().route("cdn.test/1.webp", 200, "x"));
        let (_, images) = providers(&transport, dir.path().into());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = images
            .get_image_response("https://cdn.test/1.webp", &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_provider_calls_share_one_limiter() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            StubTransport::new()
                .route("smode=1", 200, "hit=1\nhit=2")
                .route("anime/1", 200, "title=One\nimage=https://cdn/1")
                .route("anime/2", 200, "title=Two\nimage=https://cdn/2")
                .delay(std::time::Duration::from_millis(5)),
        );
        let (series, images) = providers(&transport, dir.path().into());
        let cancel = CancellationToken::new();

        let id = CatalogId::parse("2").unwrap();
        let metadata_queries = [
            SearchQuery::by_title("One"),
            SearchQuery::by_id("2"),
            SearchQuery::by_title("Two"),
        ];
        let search_queries = [SearchQuery::by_title("One"), SearchQuery::by_id("1")];

        let metadata = futures::future::join_all(
            metadata_queries.iter().map(|q| series.get_metadata(q, &cancel)),
        );
        let searches = futures::future::join_all(
            search_queries
                .iter()
                .map(|q| series.get_search_results(q, &cancel)),
        );
        let image = images.get_images(&id, &cancel);

        let (metadata, searches, image) = tokio::join!(metadata, searches, image);

        assert!(metadata.into_iter().all(|r| r.unwrap().has_metadata));
        assert!(searches.into_iter().all(|r| !r.unwrap().is_empty()));
        assert_eq!(image.unwrap().len(), 1);
        assert_eq!(transport.peak.load(Ordering::SeqCst), 1);
    }
}
