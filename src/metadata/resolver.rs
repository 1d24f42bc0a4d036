//! Resolving a [`SearchQuery`] to a catalog id.
//!
//! A known id is trusted as-is; a stale one will surface later when the
//! detail fetch fails. Otherwise the title is searched and the first hit
//! wins. There is no ranking: cached ids in existing libraries were produced
//! with this exact rule.

use std::sync::Arc;

use anisearch_common::{CatalogId, Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::provider::SearchQuery;
use crate::client::RemoteCatalogClient;

/// Outcome of resolving a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An id was found (or supplied).
    Resolved(CatalogId),
    /// Nothing matched. A normal outcome, not an error.
    Unresolved,
}

impl Resolution {
    pub fn id(&self) -> Option<&CatalogId> {
        match self {
            Self::Resolved(id) => Some(id),
            Self::Unresolved => None,
        }
    }
}

/// Maps queries to catalog ids.
pub struct IdentifierResolver {
    client: Arc<RemoteCatalogClient>,
}

impl IdentifierResolver {
    pub fn new(client: Arc<RemoteCatalogClient>) -> Self {
        Self { client }
    }

    /// Resolve `query`.
    ///
    /// Only [`Error::Cancelled`] is returned as an error; search failures are
    /// logged and reported as [`Resolution::Unresolved`].
    pub async fn resolve(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        if let Some(id) = query.anisearch_id() {
            debug!(id = %id, "Using known AniSearch id");
            return Ok(Resolution::Resolved(id));
        }

        let Some(title) = query.title() else {
            return Ok(Resolution::Unresolved);
        };

        info!(title, "Searching AniSearch");
        let ids = match self.client.search_ids(title, cancel).await {
            Ok(ids) => ids,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                warn!(title, error = %e, "AniSearch search failed");
                return Ok(Resolution::Unresolved);
            }
        };

        match ids.into_iter().next() {
            Some(id) => {
                debug!(title, id = %id, "Resolved title to first search hit");
                Ok(Resolution::Resolved(id))
            }
            None => {
                debug!(title, "No AniSearch match");
                Ok(Resolution::Unresolved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{client_with, StubTransport};

    fn resolver(transport: &Arc<StubTransport>) -> IdentifierResolver {
        IdentifierResolver::new(Arc::new(client_with(transport.clone())))
    }

    #[tokio::test]
    async fn known_id_skips_search() {
        let transport = Arc::new(StubTransport::new().route("smode=1", 200, "hit=1"));
        let query = SearchQuery::by_title("Something else entirely").with_id("999");

        let resolution = resolver(&transport)
            .resolve(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolution, Resolution::Resolved(CatalogId::parse("999").unwrap()));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn title_resolves_to_first_hit() {
        let transport = Arc::new(
            StubTransport::new().route("text=Naruto&smode=1", 200, "hit=123\nhit=456"),
        );
        let query = SearchQuery::by_title("Naruto").with_id("");

        let resolution = resolver(&transport)
            .resolve(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolution.id().map(CatalogId::as_str), Some("123"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn no_hits_is_unresolved() {
        let transport = Arc::new(StubTransport::new().route("smode=1", 200, ""));

        let resolution = resolver(&transport)
            .resolve(&SearchQuery::by_title("zzz"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolution, Resolution::Unresolved);
    }

    #[tokio::test]
    async fn search_failure_is_unresolved() {
        let transport = Arc::new(StubTransport::new().route("smode=1", 500, ""));

        let resolution = resolver(&transport)
            .resolve(&SearchQuery::by_title("Naruto"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolution, Resolution::Unresolved);
    }

    #[tokio::test]
    async fn empty_query_makes_no_requests() {
        let transport = Arc::new(StubTransport::new());

        let resolution = resolver(&transport)
            .resolve(&SearchQuery::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolution, Resolution::Unresolved);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn cancellation_propagates() {
        let transport = Arc::new(StubTransport::new().route("smode=1", 200, "hit=1"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolver(&transport)
            .resolve(&SearchQuery::by_title("Naruto"), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }
}
