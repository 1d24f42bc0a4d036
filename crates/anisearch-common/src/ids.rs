//! Catalog identifier wrapper.
//!
//! The remote catalog is the only source of identifiers; this type just keeps
//! empty strings from masquerading as a resolved entry.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque key naming one entry in the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    /// Parse a catalog ID, trimming surrounding whitespace.
    ///
    /// Returns [`Error::ParseFailed`] for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::parse_failed("catalog id is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Like [`parse`](Self::parse) but treats empty input as "no id".
    pub fn from_optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| Self::parse(s).ok())
    }

    /// Borrow the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CatalogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CatalogId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for CatalogId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
