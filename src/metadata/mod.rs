//! Metadata provider system for the AniSearch catalog.
//!
//! # Module layout
//!
//! - [`provider`] -- Host-facing traits and shared data types.
//! - [`resolver`] -- Query to catalog-id resolution.
//! - [`assembler`] -- Detail-page enrichment into a [`MetadataRecord`].
//! - [`search`] -- Deduplicated candidate search.
//! - [`providers`] -- The AniSearch implementations of the provider traits.

pub mod assembler;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod search;

pub use assembler::MetadataAssembler;
pub use provider::{
    CandidateResult, HasProviderIds, ImageProvider, MetadataProvider, MetadataRecord,
    RemoteImageInfo, SearchQuery, PROVIDER_NAME,
};
pub use providers::{AniSearchImageProvider, AniSearchSeriesProvider};
pub use resolver::{IdentifierResolver, Resolution};
pub use search::{CandidateSet, SearchAggregator};
