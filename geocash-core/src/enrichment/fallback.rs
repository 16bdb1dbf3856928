use geocash_model::GeoBounds;
use serde::{Deserialize, Serialize};

/// Half-open `[min, max)` range used for simulated amounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

/// Shape of the synthetic competitor set served while the cache is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    pub count: usize,
    pub first_id: i64,
    pub bounds: GeoBounds,
    pub banks: Vec<String>,
    pub withdrawal_flow: AmountRange,
    pub deposit_flow: AmountRange,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            count: 300,
            first_id: 9000,
            bounds: GeoBounds::new(51.08, 51.20, 71.38, 71.52),
            banks: ["Kaspi", "Halyk", "Jusan", "BCC", "Eurasian"]
                .into_iter()
                .map(String::from)
                .collect(),
            withdrawal_flow: AmountRange::new(2_000_000.0, 12_000_000.0),
            deposit_flow: AmountRange::new(1_000_000.0, 6_000_000.0),
        }
    }
}
