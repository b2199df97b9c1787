//! Persisted JSON cache of the latest ingestion pass.

mod store;

pub use store::{CacheDecodeError, CacheError, CacheStore};
