//! Candidate search for interactive disambiguation.
//!
//! Two paths feed one keyed collection: the known id (if any) and the title
//! search (if any). An id reached by both paths appears once.

use std::collections::HashMap;
use std::sync::Arc;

use anisearch_common::{CatalogId, Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::assembler::host_rating;
use super::provider::{CandidateResult, SearchQuery, PROVIDER_NAME};
use crate::client::RemoteCatalogClient;

/// Candidates keyed by id, iterated in first-insertion order.
///
/// Inserting an id that is already present replaces the earlier candidate in
/// place.
#[derive(Debug, Default)]
pub struct CandidateSet {
    index: HashMap<CatalogId, usize>,
    items: Vec<CandidateResult>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, candidate: CandidateResult) {
        if let Some(&idx) = self.index.get(&candidate.id) {
            self.items[idx] = candidate;
        } else {
            self.index.insert(candidate.id.clone(), self.items.len());
            self.items.push(candidate);
        }
    }

    pub fn contains(&self, id: &CatalogId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<CandidateResult> {
        self.items
    }
}

/// Builds deduplicated candidate lists.
pub struct SearchAggregator {
    client: Arc<RemoteCatalogClient>,
}

impl SearchAggregator {
    pub fn new(client: Arc<RemoteCatalogClient>) -> Self {
        Self { client }
    }

    /// Collect candidates for `query`.
    ///
    /// Summary fetches that fail are skipped; a failed title search
    /// contributes nothing. An empty query issues no requests.
    ///
    /// # Errors
    ///
    /// Only [`Error::Cancelled`].
    pub async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CandidateResult>> {
        let mut results = CandidateSet::new();

        if let Some(id) = query.anisearch_id() {
            self.add_summary(&mut results, &id, cancel).await?;
        }

        if let Some(title) = query.title() {
            let ids = match self.client.search_ids(title, cancel).await {
                Ok(ids) => ids,
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    warn!(title, error = %e, "AniSearch search failed");
                    Vec::new()
                }
            };
            for id in &ids {
                self.add_summary(&mut results, id, cancel).await?;
            }
        }

        debug!(candidates = results.len(), "AniSearch candidate search finished");
        Ok(results.into_vec())
    }

    async fn add_summary(
        &self,
        results: &mut CandidateSet,
        id: &CatalogId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        match self.summary(id, cancel).await {
            Ok(candidate) => results.insert(candidate),
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => warn!(id = %id, error = %e, "Skipping AniSearch candidate"),
        }
        Ok(())
    }

    /// Fetch the detail page for `id` and summarize it.
    pub async fn summary(
        &self,
        id: &CatalogId,
        cancel: &CancellationToken,
    ) -> Result<CandidateResult> {
        let body = self.client.fetch_detail(id, cancel).await?;
        let page = self.client.extractor().detail(&body);

        let title = if page.title.trim().is_empty() {
            id.to_string()
        } else {
            page.title
        };

        Ok(CandidateResult {
            id: id.clone(),
            title,
            overview: Some(page.overview).filter(|o| !o.trim().is_empty()),
            community_rating: host_rating(&page.rating),
            image_url: Some(page.image_url).filter(|u| !u.trim().is_empty()),
            provider_name: PROVIDER_NAME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{client_with, StubTransport};

    fn aggregator(transport: &Arc<StubTransport>) -> SearchAggregator {
        SearchAggregator::new(Arc::new(client_with(transport.clone())))
    }

    fn candidate(id: &str, title: &str) -> CandidateResult {
        CandidateResult {
            id: CatalogId::parse(id).unwrap(),
            title: title.to_string(),
            overview: None,
            community_rating: None,
            image_url: None,
            provider_name: PROVIDER_NAME.to_string(),
        }
    }

    fn ids(results: &[CandidateResult]) -> Vec<&str> {
        results.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn candidate_set_replaces_in_place() {
        let mut set = CandidateSet::new();
        set.insert(candidate("1", "first"));
        set.insert(candidate("2", "second"));
        set.insert(candidate("1", "replaced"));

        assert_eq!(set.len(), 2);
        assert!(set.contains(&CatalogId::parse("1").unwrap()));
        let items = set.into_vec();
        assert_eq!(ids(&items), vec!["1", "2"]);
        assert_eq!(items[0].title, "replaced");
    }

    #[tokio::test]
    async fn id_and_title_paths_are_deduplicated() {
        let transport = Arc::new(
            StubTransport::new()
                .route("text=Naruto&smode=1", 200, "hit=123\nhit=456")
                .route("anime/123", 200, "title=Naruto\nrating=4.2")
                .route("anime/456", 200, "title=Naruto Shippuden"),
        );

        let results = aggregator(&transport)
            .search(
                &SearchQuery::by_title("Naruto").with_id("123"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(ids(&results), vec!["123", "456"]);
        assert_eq!(results[0].title, "Naruto");
        assert_eq!(results[0].community_rating, Some(8.4f32));
        assert_eq!(results[1].title, "Naruto Shippuden");
        assert_eq!(results[1].community_rating, None);
    }

    #[tokio::test]
    async fn failed_summaries_are_skipped() {
        let transport = Arc::new(
            StubTransport::new()
                .route("text=Bleach&smode=1", 200, "hit=1\nhit=2\nhit=3")
                .route("anime/1", 200, "title=One")
                .route("anime/2", 500, "")
                .route("anime/3", 200, "title=Three"),
        );

        let results = aggregator(&transport)
            .search(&SearchQuery::by_title("Bleach"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(ids(&results), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn failed_search_keeps_known_id_candidate() {
        let transport = Arc::new(
            StubTransport::new()
                .route("smode=1", 503, "")
                .route("anime/9", 200, "title=Nine\nimage=https://cdn/9.webp"),
        );

        let results = aggregator(&transport)
            .search(
                &SearchQuery::by_title("Nine").with_id("9"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(ids(&results), vec!["9"]);
        assert_eq!(results[0].image_url.as_deref(), Some("https://cdn/9.webp"));
    }

    #[tokio::test]
    async fn empty_query_issues_no_requests() {
        let transport = Arc::new(StubTransport::new());

        let results = aggregator(&transport)
            .search(&SearchQuery::by_title("").with_id(""), &CancellationToken::new())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn summary_without_title_falls_back_to_id() {
        let transport = Arc::new(StubTransport::new().route("anime/77", 200, "overview=x"));

        let candidate = aggregator(&transport)
            .summary(&CatalogId::parse("77").unwrap(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(candidate.title, "77");
        assert_eq!(candidate.overview.as_deref(), Some("x"));
    }
}
