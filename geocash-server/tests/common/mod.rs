use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use axum_test::TestServer;
use geocash_config::Config;
use geocash_core::{FetchError, PoiSource};
use geocash_model::{GeoPoint, PointOfInterest, TerminalId};
use geocash_server::{AppState, create_app, infra::startup::StartupHooks};

// Code is used by test modules, but not in this scope
#[allow(unused)]
#[derive(Debug)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// Point-of-interest source returning a fixed list, or failing on demand.
#[derive(Debug, Default)]
pub struct StubSource {
    points: Vec<PointOfInterest>,
    fail: bool,
    calls: AtomicUsize,
}

#[allow(unused)]
impl StubSource {
    pub fn with_points(points: Vec<PointOfInterest>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoiSource for StubSource {
    async fn fetch_all(&self) -> Result<Vec<PointOfInterest>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Status(504));
        }
        Ok(self.points.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[allow(unused)]
pub fn poi(id: i64, name: &str, bank: &str, lat: f64, lng: f64) -> PointOfInterest {
    PointOfInterest {
        id: TerminalId(id),
        name: name.to_string(),
        bank: bank.to_string(),
        position: GeoPoint::new(lat, lng),
        tags: BTreeMap::new(),
    }
}

/// Three Astana terminals: two of them ours.
#[allow(unused)]
pub fn astana_points() -> Vec<PointOfInterest> {
    vec![
        poi(1, "ForteBank ATM", "ForteBank", 51.128, 71.430),
        poi(2, "Банкомат", "Forte", 51.160, 71.470),
        poi(3, "Kaspi ATM", "Kaspi", 51.090, 71.400),
    ]
}

#[allow(unused)]
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.network.seed = Some(7);
    config
}

#[allow(unused)]
pub async fn build_test_app_with_hooks<H: StartupHooks>(
    config: Config,
    source: Arc<dyn PoiSource>,
    hooks: &H,
) -> Result<TestApp> {
    let state = AppState::build(Arc::new(config), source, None);
    hooks.run(&state).await?;

    let server = TestServer::new(create_app(state.clone()))
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(TestApp { server, state })
}
