//! Point-of-interest providers.

pub mod overpass;

use async_trait::async_trait;
use geocash_model::PointOfInterest;

use crate::error::FetchError;

pub use overpass::{DEFAULT_OVERPASS_ENDPOINT, OverpassSource};

/// Anything that can list every terminal-like point in the service area.
///
/// Implementations should bound their own network calls; the cache applies
/// an outer timeout regardless.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<PointOfInterest>, FetchError>;

    /// Short label for log lines.
    fn name(&self) -> &'static str;
}
