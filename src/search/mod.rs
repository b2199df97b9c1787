//! Title search over a cache document.

use crate::catalog::{CacheDocument, MediaRecord};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Search query must not be empty")]
pub struct InvalidQueryError;

/// Records whose title contains `query`, ignoring case. Movies come first,
/// then shows, each in insertion order.
pub fn search<'a>(
    doc: &'a CacheDocument,
    query: &str,
) -> Result<Vec<&'a MediaRecord>, InvalidQueryError> {
    if query.trim().is_empty() {
        return Err(InvalidQueryError);
    }

    let needle = query.to_lowercase();
    Ok(doc
        .records()
        .filter(|record| record.title.to_lowercase().contains(&needle))
        .collect())
}
