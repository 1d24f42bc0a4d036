//! Host-facing provider traits and the data types they exchange.
//!
//! A host application registers [`MetadataProvider`] and [`ImageProvider`]
//! implementations and merges what they return with other sources. The
//! record and query types are associated types so a host can plug in its own.

use std::collections::HashMap;

use anisearch_common::{CatalogId, ImageType, ItemKind, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::BinaryResponse;

/// Key under which AniSearch ids live in provider-id maps.
pub const PROVIDER_NAME: &str = "AniSearch";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Something carrying external provider ids, such as a host library item.
pub trait HasProviderIds {
    /// The id this item has in `provider`'s catalog, if any.
    fn provider_id(&self, provider: &str) -> Option<&str>;
}

impl HasProviderIds for HashMap<String, String> {
    fn provider_id(&self, provider: &str) -> Option<&str> {
        self.get(provider).map(String::as_str)
    }
}

/// Lookup request: a title plus any ids the host already knows.
///
/// A non-empty AniSearch id takes precedence over the title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text title as the host knows it.
    pub title: Option<String>,
    /// Known ids keyed by provider name.
    #[serde(default)]
    pub provider_ids: HashMap<String, String>,
}

impl SearchQuery {
    /// Query by title only.
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            provider_ids: HashMap::new(),
        }
    }

    /// Query by a known AniSearch id only.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::default().with_id(id)
    }

    /// Attach a known AniSearch id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.provider_ids.insert(PROVIDER_NAME.to_string(), id.into());
        self
    }

    /// The known AniSearch id, if present and non-empty.
    pub fn anisearch_id(&self) -> Option<CatalogId> {
        CatalogId::from_optional(self.provider_id(PROVIDER_NAME))
    }

    /// The title, if present and not blank.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

impl HasProviderIds for SearchQuery {
    fn provider_id(&self, provider: &str) -> Option<&str> {
        self.provider_ids.provider_id(provider)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A search hit offered to the user for disambiguation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Catalog id of the entry.
    pub id: CatalogId,
    /// Display title.
    pub title: String,
    /// Synopsis text, if the page had one.
    pub overview: Option<String>,
    /// Community rating on the 0-10 scale.
    pub community_rating: Option<f32>,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// Name of the provider that produced this hit.
    pub provider_name: String,
}

/// Assembled metadata for one catalog entry.
///
/// `has_metadata` is `true` exactly when an id was resolved; the other fields
/// are best-effort and may be absent even then.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub has_metadata: bool,
    /// External ids keyed by provider name.
    pub provider_ids: HashMap<String, String>,
    pub overview: Option<String>,
    /// Community rating on the 0-10 scale.
    pub community_rating: Option<f32>,
    /// Deduplicated genre labels.
    pub genres: Vec<String>,
}

impl MetadataRecord {
    /// Record for a query that resolved to nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The AniSearch id this record was assembled for.
    pub fn anisearch_id(&self) -> Option<&str> {
        self.provider_id(PROVIDER_NAME)
    }
}

impl HasProviderIds for MetadataRecord {
    fn provider_id(&self, provider: &str) -> Option<&str> {
        self.provider_ids.provider_id(provider)
    }
}

/// A remote image a host may download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteImageInfo {
    /// Provider that found the image.
    pub provider_name: String,
    /// What the image depicts.
    pub image_type: ImageType,
    /// Fully-qualified URL to the image.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// Async trait for metadata sources a host can merge.
///
/// Implementations return well-formed (possibly empty) results for every
/// failure except cancellation, which is returned as
/// [`Error::Cancelled`](anisearch_common::Error::Cancelled).
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Lookup request type.
    type Query: Send + Sync;
    /// Assembled record type.
    type Record: Send;
    /// Disambiguation hit type.
    type Candidate: Send;

    /// Display name of this provider.
    fn name(&self) -> &'static str;

    /// Consultation order; more negative is consulted earlier.
    fn order(&self) -> i32;

    /// Resolve `query` and assemble its metadata.
    async fn get_metadata(
        &self,
        query: &Self::Query,
        cancel: &CancellationToken,
    ) -> Result<Self::Record>;

    /// List candidate entries matching `query`.
    async fn get_search_results(
        &self,
        query: &Self::Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<Self::Candidate>>;

    /// Download `url` under this provider's request limiter.
    async fn get_image_response(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<BinaryResponse>;
}

/// Async trait for artwork sources.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Display name of this provider.
    fn name(&self) -> &'static str;

    /// Whether this provider has artwork for items of `kind`.
    fn supports(&self, kind: ItemKind) -> bool;

    /// Image types this provider can return for items of `kind`.
    fn supported_images(&self, kind: ItemKind) -> Vec<ImageType>;

    /// Images for a known catalog id.
    async fn get_images(
        &self,
        id: &CatalogId,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteImageInfo>>;

    /// Images for a host item, looked up by its stored provider id.
    async fn get_images_for_item(
        &self,
        item: &(dyn HasProviderIds + Sync),
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteImageInfo>>;

    /// Download an image URL returned by [`get_images`](Self::get_images).
    ///
    /// The response is returned whatever its status. Network failures and
    /// cancellation are errors.
    async fn get_image_response(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<BinaryResponse>;
}
