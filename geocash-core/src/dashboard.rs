use std::sync::Arc;

use geocash_model::{DashboardResponse, DashboardSnapshot, HeatmapCollection};
use tracing::debug;

use crate::enrichment::Enricher;
use crate::grid::GridEngine;
use crate::reconciliation::ReconciliationCache;

pub const DEFAULT_FALLBACK_COUNT: usize = 300;

/// Joins the cache's latest snapshot with a freshly computed heatmap.
///
/// Assembly never fails and never waits on the network: an empty competitor
/// list is replaced by synthetic competitors, and an empty own network is
/// returned as is.
#[derive(Debug, Clone)]
pub struct DashboardAssembler {
    cache: Arc<ReconciliationCache>,
    enricher: Arc<dyn Enricher>,
    grid: GridEngine,
    fallback_count: usize,
}

impl DashboardAssembler {
    pub fn new(
        cache: Arc<ReconciliationCache>,
        enricher: Arc<dyn Enricher>,
        grid: GridEngine,
    ) -> Self {
        Self {
            cache,
            enricher,
            grid,
            fallback_count: DEFAULT_FALLBACK_COUNT,
        }
    }

    pub fn with_fallback_count(mut self, fallback_count: usize) -> Self {
        self.fallback_count = fallback_count;
        self
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.cache.current_snapshot()
    }

    pub fn heatmap(&self) -> HeatmapCollection {
        self.grid.heatmap_collection()
    }

    pub fn assemble(&self) -> DashboardResponse {
        let snapshot = self.cache.current_snapshot();

        let competitors = if snapshot.competitors.is_empty() {
            debug!(
                count = self.fallback_count,
                "no cached competitors; serving fallback set"
            );
            self.enricher
                .generate_fallback_competitors(self.fallback_count)
        } else {
            snapshot.competitors.clone()
        };

        DashboardResponse {
            own_network: snapshot.own_network.clone(),
            competitors,
            heatmap: self.heatmap(),
        }
    }
}
