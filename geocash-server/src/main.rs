//! # GeoCash Server
//!
//! Serves the ATM dashboard: own-network terminals with simulated operational
//! detail, competitor terminals from OpenStreetMap (or a synthetic fallback
//! set) and a hex-grid demand heatmap.
//!
//! ## Commands
//!
//! - `geocash-server` / `geocash-server serve`: run the HTTP server.
//! - `geocash-server traffic import [--file PATH]`: fold a road traffic CSV
//!   into the zone store and exit.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use geocash_config::{Config, ConfigLoad, ConfigLoader};
use geocash_core::{
    ImportOutcome, OverpassSource, PoiSource, PostgresTrafficIntegrator,
    import_traffic_file,
};
use geocash_server::{
    AppState, create_app,
    infra::{
        shutdown::shutdown_signal,
        startup::{ProdStartupHooks, StartupHooks},
    },
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DB_MAX_CONNECTIONS: u32 = 5;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "geocash-server")]
#[command(about = "ATM network dashboard with competitor overlay and demand heatmap")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT", global = true)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST", global = true)]
    host: Option<String>,

    /// Path to a geocash.toml file
    #[arg(long, env = "GEOCASH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Path to a .env file loaded before reading the environment
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    #[command(subcommand)]
    Traffic(TrafficCommand),
}

#[derive(Debug, Subcommand)]
enum TrafficCommand {
    /// Import a road traffic CSV into the zone store and exit
    Import {
        /// CSV to import (defaults to traffic.csv_path)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Traffic(TrafficCommand::Import { file })) => {
            run_traffic_import(&cli.serve, file).await
        }
        Some(Command::Serve) | None => run_server(cli.serve).await,
    }
}

async fn run_traffic_import(
    args: &ServeArgs,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let pool = connect_database(&config)
        .await?
        .context("traffic import requires DATABASE_URL or DB_* settings")?;

    let path = file.unwrap_or_else(|| config.traffic.csv_path.clone());
    let integrator = PostgresTrafficIntegrator::new(pool)
        .with_batch_limit(config.traffic.batch_limit);

    match import_traffic_file(&integrator, &path, config.traffic.timeout)
        .await
        .with_context(|| format!("failed to import {}", path.display()))?
    {
        ImportOutcome::NoFile => {
            anyhow::bail!("traffic file {} does not exist", path.display())
        }
        ImportOutcome::Imported {
            segments,
            zones_updated,
            archived_to,
        } => {
            info!(
                segments,
                zones_updated,
                archived_to = %archived_to.display(),
                "traffic data integrated"
            );
        }
    }
    Ok(())
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    warnings.emit();

    info!(
        network.brand_token = %config.network.brand_token,
        network.seeded = config.network.seed.is_some(),
        grid.cell_radius = config.grid.cell_radius,
        fallback.count = config.fallback.count,
        refresh = ?config.refresh.schedule(),
        "dashboard configuration in effect"
    );

    Ok(Arc::new(config))
}

async fn connect_database(config: &Config) -> anyhow::Result<Option<PgPool>> {
    let Some(url) = config.database.primary_url.as_deref() else {
        return Ok(None);
    };

    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        error!("Only PostgreSQL database URLs are supported");
        anyhow::bail!(
            "Invalid database URL: must start with postgres:// or postgresql://"
        );
    }

    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(url)
        .await
        .context("PostgreSQL connection failed")?;
    info!("Successfully connected to PostgreSQL");
    Ok(Some(pool))
}

async fn wire_app_resources(config: Arc<Config>) -> anyhow::Result<AppState> {
    let source: Arc<dyn PoiSource> = Arc::new(
        OverpassSource::new(
            config.source.endpoint.clone(),
            config.source.bounds,
            config.source.timeout,
        )
        .context("failed to build Overpass client")?,
    );

    let postgres = connect_database(&config).await?;

    Ok(AppState::build(config, source, postgres))
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    run_server_with_hooks(args, &ProdStartupHooks).await
}

async fn run_server_with_hooks<H>(
    args: ServeArgs,
    hooks: &H,
) -> anyhow::Result<()>
where
    H: StartupHooks,
{
    let config = load_runtime_config(&args)?;
    let state = wire_app_resources(Arc::clone(&config)).await?;

    hooks.run(&state).await?;

    let addr: SocketAddr = config.server.socket_addr().with_context(|| {
        format!(
            "invalid listen address {}:{}",
            config.server.host, config.server.port
        )
    })?;

    info!(
        "Starting GeoCash dashboard on {}:{}",
        config.server.host, config.server.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let router = create_app(state.clone());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.stop_refresh().await;
    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, TrafficCommand};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["geocash-server", "--port", "9000"])
            .expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, Some(9000));
    }

    #[test]
    fn traffic_import_accepts_a_file() {
        let cli = Cli::try_parse_from([
            "geocash-server",
            "traffic",
            "import",
            "--file",
            "/tmp/segments.csv",
        ])
        .expect("parse");
        match cli.command {
            Some(Command::Traffic(TrafficCommand::Import { file })) => {
                assert_eq!(file, Some(PathBuf::from("/tmp/segments.csv")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "geocash-server",
            "serve",
            "--config",
            "geocash.toml",
        ])
        .expect("parse");
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.serve.config, Some(PathBuf::from("geocash.toml")));
    }
}
