use anyhow::{Context, Result};
use clap::Parser;
use std::{fmt::Debug, path::PathBuf};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use missing_media_server::config::{AppConfig, CliConfig, FileConfig};
use missing_media_server::{run_server, AppComponents, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing the YAML manifests.
    #[clap(long, value_parser = parse_path)]
    pub manifests_dir: Option<PathBuf>,

    /// Where the JSON cache is persisted.
    #[clap(long, value_parser = parse_path)]
    pub cache_path: Option<PathBuf>,

    /// Delete the persisted cache at startup, forcing a fresh ingestion pass.
    #[clap(long)]
    pub refresh: bool,

    /// The address to bind.
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of cached posters in seconds.
    #[clap(long, default_value_t = 3600)]
    pub content_cache_age_sec: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Download posters into this directory and serve them under /images.
    #[clap(long, value_parser = parse_path)]
    pub poster_cache_dir: Option<PathBuf>,

    #[clap(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: Option<String>,

    #[clap(long, env = "TVDB_API_KEY", hide_env_values = true)]
    pub tvdb_api_key: Option<String>,

    #[clap(long, env = "TVDB_PIN", hide_env_values = true)]
    pub tvdb_pin: Option<String>,

    /// Timeout in seconds for outbound provider requests.
    #[clap(long, default_value_t = 10)]
    pub provider_timeout_sec: u64,

    /// Minimum delay between two new metadata lookups, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    pub enrichment_delay_ms: u64,

    #[clap(long, env = "OVERSEERR_URL")]
    pub overseerr_url: Option<String>,

    #[clap(long, env = "OVERSEERR_API_KEY", hide_env_values = true)]
    pub overseerr_api_key: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            manifests_dir: self.manifests_dir.clone(),
            cache_path: self.cache_path.clone(),
            host: self.host.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            content_cache_age_sec: self.content_cache_age_sec,
            frontend_dir_path: self.frontend_dir_path.clone(),
            poster_cache_dir: self.poster_cache_dir.clone(),
            tmdb_api_key: self.tmdb_api_key.clone(),
            tvdb_api_key: self.tvdb_api_key.clone(),
            tvdb_pin: self.tvdb_pin.clone(),
            provider_timeout_sec: self.provider_timeout_sec,
            enrichment_delay_ms: self.enrichment_delay_ms,
            overseerr_url: self.overseerr_url.clone(),
            overseerr_api_key: self.overseerr_api_key.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let components = AppComponents::build(&config)?;

    if cli_args.refresh {
        info!("Refresh requested, dropping cache at {:?}", config.cache_path);
        components.cache_store.invalidate().await?;
    }

    info!("Warming cache from {:?}...", config.manifests_dir);
    match components.cache_store.get_or_build().await {
        Ok(doc) => info!(
            "Cache ready: {} movies, {} shows",
            doc.movies.len(),
            doc.shows.len()
        ),
        // Requests will retry the build.
        Err(err) => error!("Failed to build cache: {}", err),
    }

    info!("Ready to serve at port {}!", config.port);
    run_server(
        components.server_config,
        components.cache_store,
        components.requester,
    )
    .await
}
