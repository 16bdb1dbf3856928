//! Terminal reconciliation: fetch, partition, enrich, publish.

pub mod cache;
pub mod partition;
pub mod schedule;

pub use cache::{DEFAULT_FETCH_TIMEOUT, ReconciliationCache, RefreshOutcome};
pub use partition::BrandMatcher;
pub use schedule::{RefreshHandle, RefreshSchedule, spawn_refresh_loop};
