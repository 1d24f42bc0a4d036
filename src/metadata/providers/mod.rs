//! Concrete metadata provider implementations.
//!
//! Each submodule wraps a single catalog and implements the
//! [`MetadataProvider`](super::MetadataProvider) and
//! [`ImageProvider`](super::ImageProvider) traits.

pub mod anisearch;

pub use anisearch::{build_providers, AniSearchImageProvider, AniSearchSeriesProvider};
