use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use geocash_model::{DashboardSnapshot, Terminal};
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use super::partition::BrandMatcher;
use crate::enrichment::Enricher;
use crate::error::FetchError;
use crate::source::PoiSource;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Summary of one successful refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshOutcome {
    pub own_network: usize,
    pub competitors: usize,
    pub generated_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Owns the published [`DashboardSnapshot`] and the refresh that replaces it.
///
/// The snapshot lives in a `watch` channel as an `Arc`, so a publication is
/// a single pointer swap: readers hold either the previous snapshot or the
/// new one, never a mixture. Refreshes are serialized; at most one is in
/// flight.
pub struct ReconciliationCache {
    source: Arc<dyn PoiSource>,
    enricher: Arc<dyn Enricher>,
    matcher: BrandMatcher,
    fetch_timeout: Duration,
    snapshot_tx: watch::Sender<Arc<DashboardSnapshot>>,
    refresh_lock: Mutex<()>,
}

impl fmt::Debug for ReconciliationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconciliationCache")
            .field("source", &self.source.name())
            .field("matcher", &self.matcher)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl ReconciliationCache {
    pub fn new(
        source: Arc<dyn PoiSource>,
        enricher: Arc<dyn Enricher>,
        matcher: BrandMatcher,
    ) -> Self {
        let (snapshot_tx, _) =
            watch::channel(Arc::new(DashboardSnapshot::default()));
        Self {
            source,
            enricher,
            matcher,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            snapshot_tx,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn enricher(&self) -> &Arc<dyn Enricher> {
        &self.enricher
    }

    /// Latest published snapshot; the empty zero value until the first
    /// successful refresh.
    pub fn current_snapshot(&self) -> Arc<DashboardSnapshot> {
        Arc::clone(&self.snapshot_tx.borrow())
    }

    /// Receiver that is notified on every publication.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Fetches, partitions and enriches, then publishes a new snapshot.
    ///
    /// On failure the published snapshot is left untouched and the error is
    /// logged before being returned.
    pub async fn refresh(&self) -> Result<RefreshOutcome, FetchError> {
        let _guard = self.refresh_lock.lock().await;
        let started = Instant::now();

        let result = self.build_snapshot().await;
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    source = self.source.name(),
                    error = %err,
                    "terminal refresh failed; keeping previous snapshot"
                );
                return Err(err);
            }
        };

        let outcome = RefreshOutcome {
            own_network: snapshot.own_network.len(),
            competitors: snapshot.competitors.len(),
            generated_at: snapshot.generated_at.unwrap_or_else(Utc::now),
            elapsed: started.elapsed(),
        };
        self.snapshot_tx.send_replace(Arc::new(snapshot));

        info!(
            own_network = outcome.own_network,
            competitors = outcome.competitors,
            elapsed = ?outcome.elapsed,
            "terminal snapshot published"
        );
        Ok(outcome)
    }

    async fn build_snapshot(&self) -> Result<DashboardSnapshot, FetchError> {
        let points = tokio::time::timeout(
            self.fetch_timeout,
            self.source.fetch_all(),
        )
        .await
        .map_err(|_| FetchError::Timeout(self.fetch_timeout))??;

        let (own, competitors) = self.matcher.partition(points);
        let own_network = own
            .into_iter()
            .map(|point| self.enricher.enrich_own_network(Terminal::from(point)))
            .collect();
        let competitors = competitors.into_iter().map(Terminal::from).collect();

        Ok(DashboardSnapshot::new(own_network, competitors, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geocash_model::{GeoPoint, PointOfInterest, TerminalId};

    use super::*;
    use crate::enrichment::{FallbackSettings, SimulatedEnricher};
    use crate::source::MockPoiSource;

    fn point(id: i64, bank: &str, name: &str) -> PointOfInterest {
        PointOfInterest {
            id: TerminalId(id),
            name: name.to_string(),
            bank: bank.to_string(),
            position: GeoPoint::new(51.12, 71.42),
            tags: BTreeMap::new(),
        }
    }

    fn fixture_points() -> Vec<PointOfInterest> {
        vec![
            point(1, "ForteBank", "Forte 24/7"),
            point(2, "Halyk Bank", "Halyk ATM"),
            point(3, "Kaspi Bank", "Kaspi ATM"),
            point(4, "Unknown", "FORTE Express"),
            point(5, "Jusan", "Jusan ATM"),
        ]
    }

    fn mock_source() -> MockPoiSource {
        let mut source = MockPoiSource::new();
        source.expect_name().return_const("mock");
        source
    }

    fn cache_with(source: MockPoiSource) -> ReconciliationCache {
        let enricher = SimulatedEnricher::seeded(
            "Forte Bank",
            FallbackSettings::default(),
            17,
        );
        ReconciliationCache::new(
            Arc::new(source),
            Arc::new(enricher),
            BrandMatcher::new("forte"),
        )
    }

    #[test]
    fn snapshot_is_empty_before_first_refresh() {
        let cache = cache_with(mock_source());
        let snapshot = cache.current_snapshot();
        assert!(!snapshot.is_populated());
        assert_eq!(snapshot.total_terminals(), 0);
    }

    #[tokio::test]
    async fn refresh_partitions_and_enriches_own_network() {
        let mut source = mock_source();
        source
            .expect_fetch_all()
            .times(1)
            .returning(|| Ok(fixture_points()));
        let cache = cache_with(source);

        let outcome = cache.refresh().await.expect("refresh");
        assert_eq!(outcome.own_network, 2);
        assert_eq!(outcome.competitors, 3);

        let snapshot = cache.current_snapshot();
        assert!(snapshot.is_populated());

        let own_ids: Vec<_> = snapshot.own_network.iter().map(|t| t.id.0).collect();
        assert_eq!(own_ids, [1, 4]);
        for terminal in &snapshot.own_network {
            assert!(terminal.is_own_network);
            assert_eq!(terminal.bank, "Forte Bank");
            assert!(terminal.has_consistent_detail());
        }

        let competitor_ids: Vec<_> =
            snapshot.competitors.iter().map(|t| t.id.0).collect();
        assert_eq!(competitor_ids, [2, 3, 5]);
        for terminal in &snapshot.competitors {
            assert!(!terminal.is_own_network);
            assert!(terminal.has_consistent_detail());
            assert!(terminal.estimated_withdrawal_flow.is_none());
        }
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let mut source = mock_source();
        let mut seq = mockall::Sequence::new();
        source
            .expect_fetch_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(fixture_points()));
        source
            .expect_fetch_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(FetchError::Status(503)));
        let cache = cache_with(source);

        cache.refresh().await.expect("first refresh");
        let before = cache.current_snapshot();

        let err = cache.refresh().await.expect_err("second refresh fails");
        assert!(matches!(err, FetchError::Status(503)));

        let after = cache.current_snapshot();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn failure_before_first_refresh_leaves_zero_snapshot() {
        let mut source = mock_source();
        source
            .expect_fetch_all()
            .returning(|| Err(FetchError::Malformed("truncated".into())));
        let cache = cache_with(source);

        assert!(cache.refresh().await.is_err());
        assert!(!cache.current_snapshot().is_populated());
    }

    #[tokio::test]
    async fn subscribers_see_each_publication() {
        let mut source = mock_source();
        source.expect_fetch_all().returning(|| Ok(fixture_points()));
        let cache = cache_with(source);
        let mut rx = cache.subscribe();

        cache.refresh().await.expect("refresh");
        rx.changed().await.expect("publication");
        assert_eq!(rx.borrow().total_terminals(), 5);
    }
}
