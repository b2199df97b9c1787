use super::RequestsLoggingLevel;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub host: String,
    pub port: u16,
    /// `Cache-Control` max-age for cached posters.
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    /// Directory served under `/images` when poster caching is enabled.
    pub poster_cache_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            host: "127.0.0.1".to_string(),
            port: 3001,
            content_cache_age_sec: 3600,
            frontend_dir_path: None,
            poster_cache_dir: None,
        }
    }
}
