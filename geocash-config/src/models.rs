use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use geocash_core::enrichment::FallbackSettings;
use geocash_core::grid::GridSettings;
use geocash_core::reconciliation::RefreshSchedule;
use geocash_model::GeoBounds;
use url::Url;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub use geocash_core::reconciliation::DEFAULT_FETCH_TIMEOUT as DEFAULT_SOURCE_TIMEOUT;
pub use geocash_core::source::DEFAULT_OVERPASS_ENDPOINT as DEFAULT_OVERPASS_URL;
pub use geocash_core::traffic::{
    DEFAULT_BATCH_LIMIT as DEFAULT_TRAFFIC_BATCH_LIMIT, DEFAULT_TRAFFIC_TIMEOUT,
    MAX_BATCH_LIMIT as MAX_TRAFFIC_BATCH_LIMIT,
};
pub const DEFAULT_BRAND_TOKEN: &str = "forte";
pub const DEFAULT_DISPLAY_NAME: &str = "Forte Bank";
pub const DEFAULT_TRAFFIC_PATH: &str = "./traffic_data.csv";

/// Area queried from the point-of-interest source.
pub const DEFAULT_SOURCE_BOUNDS: GeoBounds =
    GeoBounds::new(51.05, 51.25, 71.30, 71.55);

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub source: SourceConfig,
    pub refresh: RefreshConfig,
    pub network: NetworkConfig,
    pub grid: GridSettings,
    pub fallback: FallbackSettings,
    pub traffic: TrafficConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn has_database(&self) -> bool {
        self.database.primary_url.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
}

/// An empty origin list, or one containing `*`, allows any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_permissive(&self) -> bool {
        self.allowed_origins.is_empty()
            || self
                .allowed_origins
                .iter()
                .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub enabled: bool,
    pub endpoint: Url,
    pub bounds: GeoBounds,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_overpass_url(),
            bounds: DEFAULT_SOURCE_BOUNDS,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

pub(crate) fn default_overpass_url() -> Url {
    // Constant input; parsing cannot fail.
    Url::parse(DEFAULT_OVERPASS_URL)
        .unwrap_or_else(|_| unreachable!("default Overpass URL is valid"))
}

#[derive(Debug, Clone, Default)]
pub struct RefreshConfig {
    /// `None` refreshes once at startup.
    pub interval: Option<Duration>,
}

impl RefreshConfig {
    pub fn schedule(&self) -> RefreshSchedule {
        RefreshSchedule::from_interval(self.interval)
    }
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Case-insensitive token identifying own-network terminals.
    pub brand_token: String,
    /// Bank name stamped on own-network terminals.
    pub display_name: String,
    /// Fixed seed for the simulated data generator.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            brand_token: DEFAULT_BRAND_TOKEN.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrafficConfig {
    pub csv_path: PathBuf,
    pub batch_limit: usize,
    pub timeout: Duration,
    pub import_on_startup: bool,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_TRAFFIC_PATH),
            batch_limit: DEFAULT_TRAFFIC_BATCH_LIMIT,
            timeout: DEFAULT_TRAFFIC_TIMEOUT,
            import_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
