pub mod db_url;
pub mod error;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::models::{
    Config, ConfigMetadata, CorsConfig, DEFAULT_BRAND_TOKEN,
    DEFAULT_DISPLAY_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SOURCE_BOUNDS,
    DEFAULT_SOURCE_TIMEOUT, DEFAULT_TRAFFIC_BATCH_LIMIT, DEFAULT_TRAFFIC_PATH,
    DEFAULT_TRAFFIC_TIMEOUT, DatabaseConfig, NetworkConfig, RefreshConfig,
    ServerConfig, SourceConfig, TrafficConfig, default_overpass_url,
};
use crate::sources::{EnvConfig, FileConfig};
use crate::util::parse_interval;
use crate::validation::{self, ConfigWarnings};

use error::ConfigLoadError;

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("geocash.toml"),
        PathBuf::from("config/geocash.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };
        let (config, warnings) =
            compose_config(file_config, env_config, metadata)?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env_config.config_path {
            source.env = Some(from_env.clone());
        } else {
            source.default = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned();
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

/// Merges file and environment values over the defaults, then applies the
/// guard rails. Environment values win over the file.
pub fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No geocash.toml detected; using environment variables and defaults",
            "Create geocash.toml or pass --config to customise the grid and fallback data",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
        source: file_source,
        refresh: file_refresh,
        network: file_network,
        grid: file_grid,
        fallback: file_fallback,
        traffic: file_traffic,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let database = DatabaseConfig {
        primary_url: db_url::resolve_database_url(&env, &file_database)?,
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };

    let endpoint = match env.source_endpoint.clone().or(file_source.endpoint) {
        Some(raw) => Url::parse(raw.trim()).map_err(|source| {
            ConfigLoadError::InvalidEndpoint { value: raw, source }
        })?,
        None => default_overpass_url(),
    };
    let source = SourceConfig {
        enabled: env.source_enabled.or(file_source.enabled).unwrap_or(true),
        endpoint,
        bounds: file_source.bounds.unwrap_or(DEFAULT_SOURCE_BOUNDS),
        timeout: duration_setting(
            "source.timeout",
            env.source_timeout.clone().or(file_source.timeout),
            DEFAULT_SOURCE_TIMEOUT,
        )?,
    };

    let refresh = RefreshConfig {
        interval: match env.refresh_interval.clone().or(file_refresh.interval) {
            Some(raw) => parse_interval(&raw).map_err(|source| {
                ConfigLoadError::InvalidDuration {
                    field: "refresh.interval",
                    value: raw,
                    source,
                }
            })?,
            None => None,
        },
    };

    let network = NetworkConfig {
        brand_token: env
            .network_brand_token
            .clone()
            .or(file_network.brand_token)
            .unwrap_or_else(|| DEFAULT_BRAND_TOKEN.to_string()),
        display_name: env
            .network_display_name
            .clone()
            .or(file_network.display_name)
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        seed: env.network_seed.or(file_network.seed),
    };

    let grid = file_grid.unwrap_or_default();

    let mut fallback = file_fallback.unwrap_or_default();
    if let Some(count) = env.fallback_count {
        fallback.count = count;
    }

    let traffic = TrafficConfig {
        csv_path: env
            .traffic_csv_path
            .clone()
            .or(file_traffic.csv_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAFFIC_PATH)),
        batch_limit: env
            .traffic_batch_limit
            .or(file_traffic.batch_limit)
            .unwrap_or(DEFAULT_TRAFFIC_BATCH_LIMIT),
        timeout: duration_setting(
            "traffic.timeout",
            env.traffic_timeout.clone().or(file_traffic.timeout),
            DEFAULT_TRAFFIC_TIMEOUT,
        )?,
        import_on_startup: env
            .traffic_import_on_startup
            .or(file_traffic.import_on_startup)
            .unwrap_or(true),
    };

    let config = Config {
        server,
        database,
        cors,
        source,
        refresh,
        network,
        grid,
        fallback,
        traffic,
        dev_mode: env.dev_mode.or(file_dev_mode).unwrap_or(false),
        metadata,
    };

    warnings.extend(validation::apply_guard_rails(&config)?);
    Ok((config, warnings))
}

fn duration_setting(
    field: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        Some(value) => humantime::parse_duration(value.trim()).map_err(
            |source| ConfigLoadError::InvalidDuration {
                field,
                value,
                source,
            },
        ),
        None => Ok(default),
    }
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        if let Some(path) = &self.default {
            return Some((path.clone(), ConfigPathProvenance::Default));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(
            self,
            ConfigPathProvenance::Explicit | ConfigPathProvenance::Env
        )
    }
}

#[cfg(test)]
mod tests {
    use geocash_model::GeoBounds;

    use super::*;

    fn parse_file(raw: &str) -> FileConfig {
        toml::from_str(raw).expect("valid toml")
    }

    fn compose(
        file: Option<FileConfig>,
        env: EnvConfig,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        compose_config(file, env, ConfigMetadata::default())
    }

    #[test]
    fn defaults_track_the_core_constants() {
        let (config, _) = compose(None, EnvConfig::default()).expect("defaults");

        assert_eq!(
            config.source.endpoint.as_str(),
            geocash_core::source::DEFAULT_OVERPASS_ENDPOINT
        );
        assert_eq!(
            config.source.timeout,
            geocash_core::reconciliation::DEFAULT_FETCH_TIMEOUT
        );
        assert_eq!(
            config.traffic.batch_limit,
            geocash_core::traffic::DEFAULT_BATCH_LIMIT
        );
        assert_eq!(
            config.traffic.timeout,
            geocash_core::traffic::DEFAULT_TRAFFIC_TIMEOUT
        );
    }

    #[test]
    fn defaults_match_the_astana_deployment() {
        let (config, warnings) =
            compose(None, EnvConfig::default()).expect("defaults");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.cors.is_permissive());
        assert!(config.source.enabled);
        assert_eq!(config.source.timeout, Duration::from_secs(10));
        assert_eq!(config.source.bounds, DEFAULT_SOURCE_BOUNDS);
        assert!(config.refresh.interval.is_none());
        assert_eq!(config.network.brand_token, "forte");
        assert_eq!(config.network.display_name, "Forte Bank");
        assert_eq!(config.fallback.count, 300);
        assert_eq!(config.grid.cell_radius, 0.002);
        assert_eq!(config.traffic.batch_limit, 2000);
        assert_eq!(config.traffic.timeout, Duration::from_secs(120));
        assert!(!config.has_database());
        assert!(
            warnings
                .items
                .iter()
                .any(|w| w.message.contains("No geocash.toml"))
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let file = parse_file(
            r#"
            dev_mode = true

            [server]
            port = 9090

            [source]
            endpoint = "https://overpass.example/api/interpreter"
            timeout = "30s"
            bounds = { min_lat = 43.1, max_lat = 43.4, min_lng = 76.7, max_lng = 77.1 }

            [refresh]
            interval = "15m"

            [network]
            brand_token = "halyk"
            display_name = "Halyk Bank"
            seed = 42

            [grid]
            cell_radius = 0.004

            [fallback]
            count = 25
            banks = ["Kaspi"]
            "#,
        );

        let (config, _) =
            compose(Some(file), EnvConfig::default()).expect("config");

        assert!(config.dev_mode);
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.source.endpoint.as_str(),
            "https://overpass.example/api/interpreter"
        );
        assert_eq!(config.source.timeout, Duration::from_secs(30));
        assert_eq!(config.source.bounds, GeoBounds::new(43.1, 43.4, 76.7, 77.1));
        assert_eq!(config.refresh.interval, Some(Duration::from_secs(900)));
        assert_eq!(config.network.brand_token, "halyk");
        assert_eq!(config.network.seed, Some(42));
        assert_eq!(config.grid.cell_radius, 0.004);
        assert_eq!(config.grid.lng_aspect, 1.65);
        assert_eq!(config.fallback.count, 25);
        assert_eq!(config.fallback.banks, vec!["Kaspi".to_string()]);
        assert_eq!(config.fallback.first_id, 9000);
    }

    #[test]
    fn env_wins_over_file() {
        let file = parse_file(
            r#"
            [server]
            port = 9090

            [network]
            brand_token = "halyk"
            "#,
        );
        let env = EnvConfig {
            server_port: Some(7070),
            network_brand_token: Some("forte".into()),
            fallback_count: Some(10),
            ..EnvConfig::default()
        };

        let (config, _) = compose(Some(file), env).expect("config");
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.network.brand_token, "forte");
        assert_eq!(config.fallback.count, 10);
    }

    #[test]
    fn bad_duration_names_the_field() {
        let env = EnvConfig {
            refresh_interval: Some("every so often".into()),
            ..EnvConfig::default()
        };
        let err = compose(None, env).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidDuration {
                field: "refresh.interval",
                ..
            }
        ));
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let env = EnvConfig {
            source_endpoint: Some("overpass without scheme".into()),
            ..EnvConfig::default()
        };
        assert!(matches!(
            compose(None, env),
            Err(ConfigLoadError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn guard_rails_run_after_composition() {
        let file = parse_file(
            r#"
            [grid]
            cell_radius = -1.0
            "#,
        );
        assert!(matches!(
            compose(Some(file), EnvConfig::default()),
            Err(ConfigLoadError::GuardRail(_))
        ));
    }
}
