mod file_config;

pub use file_config::{EnrichmentConfig, FileConfig, OverseerrConfig, ProvidersConfig};

use crate::grouping::EnrichmentSettings;
use crate::providers::{TMDB_API_BASE, TMDB_IMAGE_BASE, TVDB_API_BASE};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub manifests_dir: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub poster_cache_dir: Option<PathBuf>,
    pub tmdb_api_key: Option<String>,
    pub tvdb_api_key: Option<String>,
    pub tvdb_pin: Option<String>,
    pub provider_timeout_sec: u64,
    pub enrichment_delay_ms: u64,
    pub overseerr_url: Option<String>,
    pub overseerr_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub manifests_dir: PathBuf,
    pub cache_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub poster_cache_dir: Option<PathBuf>,

    pub providers: ProviderSettings,
    pub enrichment: EnrichmentSettings,

    /// Present only when both the URL and the API key are configured.
    pub overseerr: Option<OverseerrSettings>,
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub tmdb_api_key: String,
    pub tvdb_api_key: String,
    pub tvdb_pin: Option<String>,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tvdb_base_url: String,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct OverseerrSettings {
    pub url: String,
    pub api_key: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let manifests_dir = file
            .manifests_dir
            .map(PathBuf::from)
            .or_else(|| cli.manifests_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "manifests_dir must be specified via --manifests-dir or in config file"
                )
            })?;

        if manifests_dir.exists() && !manifests_dir.is_dir() {
            bail!("manifests_dir is not a directory: {:?}", manifests_dir);
        }

        let cache_path = file
            .cache_path
            .map(PathBuf::from)
            .or_else(|| cli.cache_path.clone())
            .unwrap_or_else(|| PathBuf::from("cache.json"));

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let poster_cache_dir = file
            .poster_cache_dir
            .map(PathBuf::from)
            .or_else(|| cli.poster_cache_dir.clone());

        let providers_file = file.providers.unwrap_or_default();
        let tmdb_api_key = non_empty(providers_file.tmdb_api_key)
            .or_else(|| non_empty(cli.tmdb_api_key.clone()))
            .ok_or_else(|| {
                anyhow::anyhow!("TMDb API key must be specified via TMDB_API_KEY or [providers]")
            })?;
        let tvdb_api_key = non_empty(providers_file.tvdb_api_key)
            .or_else(|| non_empty(cli.tvdb_api_key.clone()))
            .ok_or_else(|| {
                anyhow::anyhow!("TVDb API key must be specified via TVDB_API_KEY or [providers]")
            })?;
        let providers = ProviderSettings {
            tmdb_api_key,
            tvdb_api_key,
            tvdb_pin: non_empty(providers_file.tvdb_pin).or_else(|| non_empty(cli.tvdb_pin.clone())),
            tmdb_base_url: providers_file
                .tmdb_base_url
                .unwrap_or_else(|| TMDB_API_BASE.to_string()),
            tmdb_image_base_url: providers_file
                .tmdb_image_base_url
                .unwrap_or_else(|| TMDB_IMAGE_BASE.to_string()),
            tvdb_base_url: providers_file
                .tvdb_base_url
                .unwrap_or_else(|| TVDB_API_BASE.to_string()),
            timeout_sec: providers_file
                .timeout_sec
                .unwrap_or(cli.provider_timeout_sec),
        };

        let enrichment_file = file.enrichment.unwrap_or_default();
        let enrichment = EnrichmentSettings {
            delay: Duration::from_millis(
                enrichment_file.delay_ms.unwrap_or(cli.enrichment_delay_ms),
            ),
            max_concurrent_lookups: enrichment_file.max_concurrent_lookups.unwrap_or(5),
        };
        if enrichment.max_concurrent_lookups == 0 {
            bail!("enrichment.max_concurrent_lookups must be at least 1");
        }

        let overseerr_file = file.overseerr.unwrap_or_default();
        let overseerr_url =
            non_empty(overseerr_file.url).or_else(|| non_empty(cli.overseerr_url.clone()));
        let overseerr_api_key =
            non_empty(overseerr_file.api_key).or_else(|| non_empty(cli.overseerr_api_key.clone()));
        let overseerr = match (overseerr_url, overseerr_api_key) {
            (Some(url), Some(api_key)) => Some(OverseerrSettings { url, api_key }),
            (None, None) => None,
            _ => bail!("Both the Overseerr URL and API key must be provided together"),
        };

        Ok(Self {
            manifests_dir,
            cache_path,
            host,
            port,
            logging_level,
            content_cache_age_sec,
            frontend_dir_path,
            poster_cache_dir,
            providers,
            enrichment,
            overseerr,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
