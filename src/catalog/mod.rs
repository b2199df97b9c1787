mod models;

pub use models::{CacheDocument, MediaDetails, MediaKind, MediaRecord};
