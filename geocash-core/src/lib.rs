//! # GeoCash Core
//!
//! Algorithms and background services behind the GeoCash ATM dashboard.
//!
//! - [`grid`]: deterministic hex-grid demand heatmap.
//! - [`reconciliation`]: fetches points of interest, splits them into the own
//!   network and competitors, enriches the own network and publishes an
//!   immutable snapshot.
//! - [`dashboard`]: joins the latest snapshot with a fresh heatmap, falling
//!   back to synthetic competitors while the cache is empty.
//! - [`enrichment`]: simulated operational data for terminals.
//! - [`source`]: point-of-interest providers (Overpass API).
//! - [`traffic`]: offline job folding road traffic counts into zone scores.
#![allow(missing_docs)]

pub mod dashboard;
pub mod enrichment;
pub mod error;
pub mod grid;
pub mod reconciliation;
pub mod source;
pub mod traffic;

pub use dashboard::DashboardAssembler;
pub use enrichment::{Enricher, FallbackSettings, SimulatedEnricher};
pub use error::{FetchError, IngestError};
pub use grid::{GridEngine, GridSettings, HexLayout, WeightModel, generate_heatmap};
pub use reconciliation::{
    BrandMatcher, RefreshHandle, RefreshOutcome, RefreshSchedule,
    ReconciliationCache, spawn_refresh_loop,
};
pub use source::{OverpassSource, PoiSource};
pub use traffic::{
    ImportOutcome, PostgresTrafficIntegrator, TrafficIntegrator, TrafficSegment,
    import_traffic_file, load_traffic_csv,
};
