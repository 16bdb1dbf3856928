use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::{TrafficIntegrator, TrafficSegment};
use crate::error::IngestError;

pub const DEFAULT_BATCH_LIMIT: usize = 2000;

const BINDS_PER_ROW: usize = 2;

/// Largest batch that fits in one statement under Postgres' bind limit.
pub const MAX_BATCH_LIMIT: usize = u16::MAX as usize / BINDS_PER_ROW;

const CREATE_STAGING_TABLE: &str = "CREATE TEMP TABLE temp_csv_traffic (traffic INT, geom TEXT) ON COMMIT DROP";

const UPDATE_ZONE_SCORES: &str = r#"
    UPDATE geo_traffic_zones z
    SET traffic_score = sub.total_traffic / 100
    FROM (
        SELECT z.id, SUM(t.traffic) AS total_traffic
        FROM geo_traffic_zones z
        JOIN temp_csv_traffic t
          ON ST_Intersects(z.area_polygon, ST_GeomFromText(t.geom, 4326))
        GROUP BY z.id
    ) sub
    WHERE z.id = sub.id
"#;

/// Folds traffic counts into `geo_traffic_zones.traffic_score` with a
/// PostGIS intersection join.
#[derive(Debug, Clone)]
pub struct PostgresTrafficIntegrator {
    pool: PgPool,
    batch_limit: usize,
}

impl PostgresTrafficIntegrator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    /// Caps how many segments are staged per run, clamped to
    /// `1..=MAX_BATCH_LIMIT`.
    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit.clamp(1, MAX_BATCH_LIMIT);
        self
    }
}

#[async_trait]
impl TrafficIntegrator for PostgresTrafficIntegrator {
    async fn enrich_zones_with_traffic(
        &self,
        segments: &[TrafficSegment],
    ) -> Result<u64, IngestError> {
        if segments.is_empty() {
            return Ok(0);
        }

        let staged = &segments[..segments.len().min(self.batch_limit)];

        let mut tx = self.pool.begin().await?;
        sqlx::query(CREATE_STAGING_TABLE).execute(&mut *tx).await?;

        let mut insert = QueryBuilder::<Postgres>::new(
            "INSERT INTO temp_csv_traffic (traffic, geom) ",
        );
        insert.push_values(staged, |mut row, segment| {
            row.push_bind(segment.weekday_traffic)
                .push_bind(segment.geometry.as_str());
        });
        insert.build().execute(&mut *tx).await?;

        let updated = sqlx::query(UPDATE_ZONE_SCORES)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        info!(
            staged = staged.len(),
            skipped = segments.len() - staged.len(),
            zones_updated = updated,
            "traffic zones updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://geocash@localhost/geocash")
            .expect("lazy pool")
    }

    #[test]
    fn max_batch_fits_the_bind_limit() {
        assert_eq!(MAX_BATCH_LIMIT, 32_767);
    }

    #[tokio::test]
    async fn batch_limit_is_clamped() {
        let integrator =
            PostgresTrafficIntegrator::new(lazy_pool()).with_batch_limit(100_000);
        assert_eq!(integrator.batch_limit, MAX_BATCH_LIMIT);

        let integrator =
            PostgresTrafficIntegrator::new(lazy_pool()).with_batch_limit(0);
        assert_eq!(integrator.batch_limit, 1);
    }
}
