//! Deterministic locations for cached artifacts.
//!
//! Image locations are stored as `{root}/{namespace}/{category}/{id}.txt`.
//! The same three key parts always map to the same file, which is what lets
//! a downstream reader find what the provider wrote.

use std::path::{Path, PathBuf};

use crate::CatalogId;

/// Extension used for image-location files.
const LOCATION_EXTENSION: &str = "txt";

/// Build the path for an image-location entry.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use anisearch_common::CatalogId;
/// use anisearch_common::paths::image_location_path;
///
/// let id = CatalogId::parse("3633").unwrap();
/// let path = image_location_path(Path::new("/cache"), "anisearch", "image", &id);
/// assert_eq!(path, PathBuf::from("/cache/anisearch/image/3633.txt"));
/// ```
pub fn image_location_path(
    root: &Path,
    namespace: &str,
    category: &str,
    id: &CatalogId,
) -> PathBuf {
    root.join(sanitize_component(namespace))
        .join(sanitize_component(category))
        .join(format!(
            "{}.{}",
            sanitize_component(id.as_str()),
            LOCATION_EXTENSION
        ))
}

/// Replace characters that would escape or split a path component.
fn sanitize_component(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned == "." || cleaned == ".." {
        cleaned.replace('.', "_")
    } else {
        cleaned
    }
}
