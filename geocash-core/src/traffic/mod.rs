//! Offline traffic ingestion.
//!
//! Loads a road traffic CSV and folds the counts into per-zone traffic
//! scores in PostgreSQL. Nothing on the dashboard read path consumes the
//! result yet.

pub mod csv_loader;
pub mod postgres;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::IngestError;

pub use csv_loader::{load_traffic_csv, parse_traffic_csv};
pub use postgres::{
    DEFAULT_BATCH_LIMIT, MAX_BATCH_LIMIT, PostgresTrafficIntegrator,
};

pub const DEFAULT_TRAFFIC_TIMEOUT: Duration = Duration::from_secs(120);

/// One road segment from the traffic export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficSegment {
    pub edge_id: i64,
    pub weekday_traffic: i32,
    /// Segment geometry as WKT in EPSG:4326.
    pub geometry: String,
}

#[async_trait]
pub trait TrafficIntegrator: Send + Sync {
    /// Applies `segments` to the zone store and returns how many zones
    /// changed. Empty input is a no-op.
    async fn enrich_zones_with_traffic(
        &self,
        segments: &[TrafficSegment],
    ) -> Result<u64, IngestError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    NoFile,
    Imported {
        segments: usize,
        zones_updated: u64,
        archived_to: PathBuf,
    },
}

/// `<path>.processed`, the name a file is archived under after import.
pub fn processed_path(path: &Path) -> PathBuf {
    let mut archived = OsString::from(path.as_os_str());
    archived.push(".processed");
    PathBuf::from(archived)
}

/// Loads `path`, integrates it within `timeout`, then renames the file so
/// the next start does not import it again. A failed run leaves the file in
/// place.
pub async fn import_traffic_file(
    integrator: &dyn TrafficIntegrator,
    path: &Path,
    timeout: Duration,
) -> Result<ImportOutcome, IngestError> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(ImportOutcome::NoFile);
    }

    info!(path = %path.display(), "traffic file found; importing");
    let owned = path.to_path_buf();
    let segments = tokio::task::spawn_blocking(move || load_traffic_csv(owned))
        .await
        .map_err(std::io::Error::other)??;

    let zones_updated = tokio::time::timeout(
        timeout,
        integrator.enrich_zones_with_traffic(&segments),
    )
    .await
    .map_err(|_| IngestError::Timeout(timeout))??;

    let archived_to = processed_path(path);
    tokio::fs::rename(path, &archived_to).await?;

    Ok(ImportOutcome::Imported {
        segments: segments.len(),
        zones_updated,
        archived_to,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingIntegrator {
        received: Mutex<Vec<TrafficSegment>>,
    }

    #[async_trait]
    impl TrafficIntegrator for RecordingIntegrator {
        async fn enrich_zones_with_traffic(
            &self,
            segments: &[TrafficSegment],
        ) -> Result<u64, IngestError> {
            self.received
                .lock()
                .expect("lock")
                .extend_from_slice(segments);
            Ok(3)
        }
    }

    struct StalledIntegrator;

    #[async_trait]
    impl TrafficIntegrator for StalledIntegrator {
        async fn enrich_zones_with_traffic(
            &self,
            _segments: &[TrafficSegment],
        ) -> Result<u64, IngestError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(0)
        }
    }

    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("traffic_data.csv");
        std::fs::write(
            &path,
            "edge_id,weekday,weekend,speed,lanes,geometry\n\
             1.5E+3,10,0,0,0,POINT(71.4 51.1)\n\
             2000,20,0,0,0,POINT(71.5 51.2)\n",
        )
        .expect("write fixture");
        path
    }

    #[test]
    fn processed_path_appends_suffix() {
        assert_eq!(
            processed_path(Path::new("/data/traffic_data.csv")),
            PathBuf::from("/data/traffic_data.csv.processed")
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let outcome = import_traffic_file(
            &RecordingIntegrator::default(),
            &dir.path().join("traffic_data.csv"),
            DEFAULT_TRAFFIC_TIMEOUT,
        )
        .await
        .expect("import");
        assert_eq!(outcome, ImportOutcome::NoFile);
    }

    #[tokio::test]
    async fn successful_import_archives_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_fixture(dir.path());
        let integrator = RecordingIntegrator::default();

        let outcome =
            import_traffic_file(&integrator, &path, DEFAULT_TRAFFIC_TIMEOUT)
                .await
                .expect("import");

        let archived = processed_path(&path);
        assert_eq!(
            outcome,
            ImportOutcome::Imported {
                segments: 2,
                zones_updated: 3,
                archived_to: archived.clone(),
            }
        );
        assert!(!path.exists());
        assert!(archived.exists());

        let received = integrator.received.lock().expect("lock");
        assert_eq!(received[0].edge_id, 1500);
        assert_eq!(received[1].weekday_traffic, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_integration_times_out_and_keeps_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_fixture(dir.path());

        let err = import_traffic_file(
            &StalledIntegrator,
            &path,
            Duration::from_secs(120),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::Timeout(_)));
        assert!(path.exists());
    }
}
