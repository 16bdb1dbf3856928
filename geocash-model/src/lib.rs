//! Core data model definitions shared across GeoCash crates.
#![allow(missing_docs)]

pub mod dashboard;
pub mod geo;
pub mod heatmap;
pub mod poi;
pub mod terminal;

// Intentionally curated re-exports for downstream consumers.
pub use dashboard::{DashboardResponse, DashboardSnapshot};
pub use geo::{GeoBounds, GeoPoint};
pub use heatmap::{HeatmapCollection, HeatmapFeature, HexCell, PolygonGeometry};
pub use poi::{PointOfInterest, TerminalId};
pub use terminal::{
    Cassette, CassetteKind, CassetteStatus, Complaint, ComplaintCategory,
    ComplaintStatus, EfficiencyStatus, Terminal,
};
