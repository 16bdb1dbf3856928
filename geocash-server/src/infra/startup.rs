use anyhow::Result;
use async_trait::async_trait;
use geocash_core::{
    ImportOutcome, PostgresTrafficIntegrator, import_traffic_file,
    spawn_refresh_loop,
};
use tracing::{error, info, warn};

use crate::infra::app_state::AppState;

#[async_trait]
pub trait StartupHooks: Send + Sync {
    async fn run(&self, state: &AppState) -> Result<()>;
}

/// Starts the terminal refresh loop and, when a database is configured,
/// imports a pending traffic file.
#[derive(Debug, Default)]
pub struct ProdStartupHooks;

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(&self, state: &AppState) -> Result<()> {
        let config = state.config();

        if config.source.enabled {
            let schedule = config.refresh.schedule();
            info!(?schedule, endpoint = %config.source.endpoint, "starting terminal refresh");
            let handle =
                spawn_refresh_loop(std::sync::Arc::clone(state.cache()), schedule);
            state.install_refresh(handle).await;
        } else {
            warn!("point-of-interest source disabled; serving fallback competitors only");
        }

        if config.traffic.import_on_startup
            && let Some(pool) = state.postgres()
        {
            let integrator = PostgresTrafficIntegrator::new(pool.clone())
                .with_batch_limit(config.traffic.batch_limit);
            match import_traffic_file(
                &integrator,
                &config.traffic.csv_path,
                config.traffic.timeout,
            )
            .await
            {
                Ok(ImportOutcome::NoFile) => {
                    info!(
                        path = %config.traffic.csv_path.display(),
                        "no traffic file to import"
                    );
                }
                Ok(ImportOutcome::Imported {
                    segments,
                    zones_updated,
                    archived_to,
                }) => {
                    info!(
                        segments,
                        zones_updated,
                        archived_to = %archived_to.display(),
                        "traffic data integrated"
                    );
                }
                Err(err) => {
                    error!(error = %err, "traffic import failed");
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopStartupHooks;

#[async_trait]
impl StartupHooks for NoopStartupHooks {
    async fn run(&self, _state: &AppState) -> Result<()> {
        Ok(())
    }
}
