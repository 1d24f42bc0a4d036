//! AniSearch - Anime metadata provider
//!
//! Resolves titles to AniSearch entries, assembles metadata from their detail
//! pages, and exposes it through host-facing provider traits.

pub mod cache;
pub mod client;
pub mod config;
pub mod extract;
pub mod genres;
pub mod metadata;

pub use anisearch_common::{CatalogId, Error, ImageType, ItemKind, Result};
