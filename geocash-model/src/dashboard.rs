use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::heatmap::HeatmapCollection;
use crate::terminal::Terminal;

/// Immutable view of the terminal partition. Replaced wholesale on every
/// successful refresh; never edited in place.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DashboardSnapshot {
    pub own_network: Vec<Terminal>,
    pub competitors: Vec<Terminal>,
    /// `None` until the first successful refresh.
    pub generated_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn new(
        own_network: Vec<Terminal>,
        competitors: Vec<Terminal>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            own_network,
            competitors,
            generated_at: Some(generated_at),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.generated_at.is_some()
    }

    pub fn total_terminals(&self) -> usize {
        self.own_network.len() + self.competitors.len()
    }
}

/// Payload returned by the dashboard endpoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DashboardResponse {
    pub own_network: Vec<Terminal>,
    pub competitors: Vec<Terminal>,
    pub heatmap: HeatmapCollection,
}
