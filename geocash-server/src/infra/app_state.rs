use std::{fmt, sync::Arc};

use geocash_config::Config;
use geocash_core::{
    BrandMatcher, DashboardAssembler, Enricher, GridEngine, PoiSource,
    ReconciliationCache, RefreshHandle, SimulatedEnricher,
};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<ReconciliationCache>,
    pub assembler: Arc<DashboardAssembler>,
    pub postgres: Option<PgPool>,
    /// Background refresh task, installed by the startup hooks.
    pub refresh: Arc<Mutex<Option<RefreshHandle>>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("cache", &self.cache)
            .field("database", &self.postgres.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the cache, enricher and assembler from configuration around the
    /// given point-of-interest source.
    pub fn build(
        config: Arc<Config>,
        source: Arc<dyn PoiSource>,
        postgres: Option<PgPool>,
    ) -> Self {
        let enricher: Arc<dyn Enricher> = Arc::new(SimulatedEnricher::new(
            config.network.display_name.clone(),
            config.fallback.clone(),
            config.network.seed,
        ));

        let cache = Arc::new(
            ReconciliationCache::new(
                source,
                Arc::clone(&enricher),
                BrandMatcher::new(&config.network.brand_token),
            )
            .with_fetch_timeout(config.source.timeout),
        );

        let assembler = DashboardAssembler::new(
            Arc::clone(&cache),
            enricher,
            GridEngine::new(config.grid.clone()),
        )
        .with_fallback_count(config.fallback.count);

        Self {
            config,
            cache,
            assembler: Arc::new(assembler),
            postgres,
            refresh: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ReconciliationCache> {
        &self.cache
    }

    pub fn assembler(&self) -> &Arc<DashboardAssembler> {
        &self.assembler
    }

    pub fn postgres(&self) -> Option<&PgPool> {
        self.postgres.as_ref()
    }

    /// Stores the refresh task handle, stopping any task it replaces.
    pub async fn install_refresh(&self, handle: RefreshHandle) {
        let previous = self.refresh.lock().await.replace(handle);
        if let Some(previous) = previous {
            previous.shutdown().await;
        }
    }

    /// Stops the background refresh task, if one is running.
    pub async fn stop_refresh(&self) {
        let handle = self.refresh.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
            info!("terminal refresh task stopped");
        }
    }
}
