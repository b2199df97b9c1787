//! Missing Media Server Library
//!
//! Ingests YAML manifests of missing movies and shows, enriches them through
//! TMDb and TVDb, and serves the cached result over HTTP.

pub mod app;
pub mod cache_store;
pub mod catalog;
pub mod config;
pub mod fulfillment;
pub mod grouping;
pub mod manifest;
pub mod providers;
pub mod search;
pub mod server;

// Re-export commonly used types for convenience
pub use app::AppComponents;
pub use cache_store::CacheStore;
pub use catalog::{CacheDocument, MediaKind, MediaRecord};
pub use server::{run_server, RequestsLoggingLevel};
