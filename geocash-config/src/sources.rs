use std::path::PathBuf;

use geocash_core::enrichment::FallbackSettings;
use geocash_core::grid::GridSettings;
use geocash_model::GeoBounds;
use serde::{Deserialize, Serialize};

use crate::util::{
    non_empty_var, parse_bool_var, parse_csv_var, parse_var,
};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub source: FileSourceConfig,
    #[serde(default)]
    pub refresh: FileRefreshConfig,
    #[serde(default)]
    pub network: FileNetworkConfig,
    pub grid: Option<GridSettings>,
    pub fallback: Option<FallbackSettings>,
    #[serde(default)]
    pub traffic: FileTrafficConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSourceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<GeoBounds>,
    /// `humantime` duration, e.g. `"10s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRefreshConfig {
    /// `humantime` duration; absent or `"off"` refreshes once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileNetworkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTrafficConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_on_startup: Option<bool>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_password: Option<String>,
    pub database_name: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub source_enabled: Option<bool>,
    pub source_endpoint: Option<String>,
    pub source_timeout: Option<String>,
    pub refresh_interval: Option<String>,
    pub network_brand_token: Option<String>,
    pub network_display_name: Option<String>,
    pub network_seed: Option<u64>,
    pub fallback_count: Option<usize>,
    pub traffic_csv_path: Option<PathBuf>,
    pub traffic_batch_limit: Option<usize>,
    pub traffic_timeout: Option<String>,
    pub traffic_import_on_startup: Option<bool>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var("GEOCASH_CONFIG").map(PathBuf::from),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: parse_var("SERVER_PORT"),
            database_url: non_empty_var("DATABASE_URL"),
            database_host: non_empty_var("DB_HOST"),
            database_port: parse_var("DB_PORT"),
            database_user: non_empty_var("DB_USER"),
            database_password: std::env::var("DB_PASSWORD").ok(),
            database_name: non_empty_var("DB_NAME"),
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
            source_enabled: parse_bool_var("SOURCE_ENABLED"),
            source_endpoint: non_empty_var("OVERPASS_URL"),
            source_timeout: non_empty_var("SOURCE_TIMEOUT"),
            refresh_interval: non_empty_var("REFRESH_INTERVAL"),
            network_brand_token: non_empty_var("NETWORK_BRAND_TOKEN"),
            network_display_name: non_empty_var("NETWORK_DISPLAY_NAME"),
            network_seed: parse_var("ENRICHMENT_SEED"),
            fallback_count: parse_var("FALLBACK_COMPETITOR_COUNT"),
            traffic_csv_path: non_empty_var("TRAFFIC_CSV_PATH")
                .map(PathBuf::from),
            traffic_batch_limit: parse_var("TRAFFIC_BATCH_LIMIT"),
            traffic_timeout: non_empty_var("TRAFFIC_TIMEOUT"),
            traffic_import_on_startup: parse_bool_var("TRAFFIC_IMPORT_ON_STARTUP"),
            dev_mode: parse_bool_var("DEV_MODE"),
        }
    }
}
