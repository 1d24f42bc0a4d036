//! AniSearch-Common: Shared types, identifiers, and errors.
//!
//! This crate provides common functionality used by the AniSearch provider:
//!
//! - **Catalog IDs**: A validated wrapper around the catalog's opaque key
//! - **Core Types**: Enums for item kinds and image types understood by hosts
//! - **Path Utilities**: Deterministic cache locations for stored artifacts
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use anisearch_common::{CatalogId, ImageType, Error, Result};
//!
//! let id = CatalogId::parse("3633").unwrap();
//! assert_eq!(id.as_str(), "3633");
//! assert_eq!(ImageType::Primary.to_string(), "primary");
//!
//! fn example() -> Result<()> {
//!     Err(Error::Cancelled)
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
