//! Assembling a [`MetadataRecord`] from a query.
//!
//! The [`MetadataAssembler`] runs the full lookup: resolve the id, fetch the
//! detail page, extract fields, normalize them, and store the cover URL in
//! the [`ImageLocationCache`]. Everything after resolution is best-effort.

use std::sync::Arc;

use anisearch_common::{CatalogId, Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::provider::{MetadataRecord, SearchQuery, PROVIDER_NAME};
use super::resolver::{IdentifierResolver, Resolution};
use crate::cache::{ImageLocationCache, IMAGE_CATEGORY, NAMESPACE};
use crate::client::RemoteCatalogClient;
use crate::extract::DetailPage;
use crate::genres;

/// AniSearch rates on 0-5; hosts expect 0-10.
pub const RATING_SCALE: f32 = 2.0;

/// Parse a native rating using `.` as decimal separator.
///
/// Returns `None` for empty, non-numeric, non-finite, or comma-separated
/// input.
pub fn parse_rating(text: &str) -> Option<f32> {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|r| r.is_finite())
}

/// Parse and rescale a native rating onto the host scale.
pub fn host_rating(text: &str) -> Option<f32> {
    parse_rating(text).map(|r| r * RATING_SCALE)
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Orchestrates resolution, fetching, extraction, and image caching.
pub struct MetadataAssembler {
    client: Arc<RemoteCatalogClient>,
    resolver: IdentifierResolver,
    cache: Arc<ImageLocationCache>,
}

impl MetadataAssembler {
    pub fn new(client: Arc<RemoteCatalogClient>, cache: Arc<ImageLocationCache>) -> Self {
        Self {
            resolver: IdentifierResolver::new(client.clone()),
            client,
            cache,
        }
    }

    /// Resolve `query` and assemble its metadata.
    ///
    /// 1. Resolves the id; an unresolved query yields [`MetadataRecord::empty`].
    /// 2. Fetches the detail page. A failed fetch is logged and treated as an
    ///    empty page.
    /// 3. Extracts overview, rating, genres, and cover URL.
    /// 4. Rescales the rating and cleans up genres.
    /// 5. Stores the cover URL in the image-location cache.
    ///
    /// # Errors
    ///
    /// Only [`Error::Cancelled`].
    pub async fn assemble(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<MetadataRecord> {
        let id = match self.resolver.resolve(query, cancel).await? {
            Resolution::Resolved(id) => id,
            Resolution::Unresolved => {
                info!(title = ?query.title(), "No AniSearch entry; returning empty record");
                return Ok(MetadataRecord::empty());
            }
        };

        let body = match self.client.fetch_detail(&id, cancel).await {
            Ok(body) => body,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to fetch AniSearch detail page");
                String::new()
            }
        };

        let page = self.client.extractor().detail(&body);
        let record = build_record(&id, &page);
        self.store_image_url(&id, &page.image_url);

        info!(
            id = %id,
            rating = ?record.community_rating,
            genres = record.genres.len(),
            "Assembled AniSearch metadata"
        );

        Ok(record)
    }

    /// Best-effort write of the cover URL. Failures are logged only.
    fn store_image_url(&self, id: &CatalogId, url: &str) {
        store_image_url(&self.cache, id, url);
    }
}

/// Store `url` as the cover location for `id`, logging any failure.
pub(crate) fn store_image_url(cache: &ImageLocationCache, id: &CatalogId, url: &str) {
    let url = url.trim();
    if url.is_empty() {
        debug!(id = %id, "No cover URL to store");
        return;
    }
    if let Err(e) = cache.put(NAMESPACE, IMAGE_CATEGORY, id, url) {
        warn!(id = %id, error = %e, "Failed to store AniSearch image location");
    }
}

/// Build a record from extracted page fields.
fn build_record(id: &CatalogId, page: &DetailPage) -> MetadataRecord {
    let mut record = MetadataRecord {
        has_metadata: true,
        ..MetadataRecord::default()
    };
    record
        .provider_ids
        .insert(PROVIDER_NAME.to_string(), id.to_string());

    record.overview = non_empty(page.overview.clone());

    record.community_rating = host_rating(&page.rating);
    if record.community_rating.is_none() && !page.rating.trim().is_empty() {
        debug!(id = %id, raw = %page.rating, "Ignoring unparseable rating");
    }

    record.genres = page.genres.clone();
    genres::cleanup(&mut record.genres);

    record
}
