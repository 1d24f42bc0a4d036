//! On-disk image-location cache.
//!
//! Stores the resolved cover URL for an entry so a downstream image resolver
//! can find it without re-fetching the detail page. Each entry is a plain text
//! file holding just the URL, replaced atomically on every write.

use std::io::Write;
use std::path::PathBuf;

use anisearch_common::paths::image_location_path;
use anisearch_common::{CatalogId, Error, Result};
use tracing::debug;

/// Namespace under which AniSearch entries are stored.
pub const NAMESPACE: &str = "anisearch";

/// Category used for cover images.
pub const IMAGE_CATEGORY: &str = "image";

/// Filesystem manager for image-location entries.
///
/// Organizes entries under `{root}/{namespace}/{category}/{id}.txt`.
pub struct ImageLocationCache {
    root: PathBuf,
}

impl ImageLocationCache {
    /// Create a cache rooted at `root`. Nothing is created until the first write.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Path where the entry for the given key parts lives.
    pub fn path_for(&self, namespace: &str, category: &str, id: &CatalogId) -> PathBuf {
        image_location_path(&self.root, namespace, category, id)
    }

    /// Write `url` as the entry for the given key parts.
    ///
    /// Missing directories are created. The content goes to a temporary file
    /// in the target directory which is then renamed over the entry, so
    /// readers see either the old URL or the new one.
    pub fn put(
        &self,
        namespace: &str,
        category: &str,
        id: &CatalogId,
        url: &str,
    ) -> Result<PathBuf> {
        let path = self.path_for(namespace, category, id);
        let persist_err = |source: std::io::Error| Error::PersistFailed {
            path: path.clone(),
            source,
        };

        let dir = path
            .parent()
            .ok_or_else(|| persist_err(std::io::Error::other("entry path has no parent")))?;
        std::fs::create_dir_all(dir).map_err(persist_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persist_err)?;
        tmp.write_all(url.as_bytes()).map_err(persist_err)?;
        tmp.persist(&path).map_err(|e| persist_err(e.error))?;

        debug!(id = %id, category, path = %path.display(), "Stored image location");
        Ok(path)
    }
}
