//! Host-facing type definitions for item kinds and images.
//!
//! All enums are serialized in lowercase to match what media-server hosts
//! expect on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of library item a host may ask a provider about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A single movie.
    Movie,
    /// A TV series (show).
    Series,
    /// A season within a series.
    Season,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
            Self::Season => write!(f, "season"),
        }
    }
}

/// Type of item image/artwork.
///
/// AniSearch only offers a cover, so hosts only ever see `Primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// Primary poster/cover image.
    Primary,
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
        }
    }
}
