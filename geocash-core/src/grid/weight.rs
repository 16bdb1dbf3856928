use geocash_model::GeoPoint;
use serde::{Deserialize, Serialize};

/// A fixed demand concentration with linear falloff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub name: String,
    pub position: GeoPoint,
    /// Contribution at the hotspot centre, before clamping.
    pub peak: f64,
}

impl Hotspot {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64, peak: f64) -> Self {
        Self {
            name: name.into(),
            position: GeoPoint::new(lat, lng),
            peak,
        }
    }
}

/// Deterministic synthetic demand model evaluated at hex cell centres.
///
/// The weight of a point is built from three parts:
///
/// 1. a hard cutoff: anything farther than `cutoff_radius` from `centroid`
///    weighs zero,
/// 2. a smooth texture `(sin(lat·k)·cos(lng·k) + 1) × texture_amplitude`,
/// 3. the sum of hotspot contributions `peak × (1 − d/hotspot_radius)` for
///    every hotspot closer than `hotspot_radius`,
///
/// clamped to `[0, 1]`. Cells at or below `visibility_threshold` are dropped
/// from the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightModel {
    pub centroid: GeoPoint,
    pub cutoff_radius: f64,
    pub texture_frequency: f64,
    pub texture_amplitude: f64,
    pub hotspot_radius: f64,
    pub hotspots: Vec<Hotspot>,
    pub visibility_threshold: f64,
}

impl Default for WeightModel {
    fn default() -> Self {
        Self {
            centroid: GeoPoint::new(51.13, 71.43),
            cutoff_radius: 0.16,
            texture_frequency: 400.0,
            texture_amplitude: 0.15,
            hotspot_radius: 0.035,
            hotspots: vec![
                Hotspot::new("left-bank-centre", 51.128, 71.430, 0.8),
                Hotspot::new("right-bank-old-town", 51.165, 71.425, 0.7),
                Hotspot::new("khan-shatyr", 51.131, 71.402, 0.9),
            ],
            visibility_threshold: 0.05,
        }
    }
}

impl WeightModel {
    /// Demand weight in `[0, 1]` at `point`. Points outside the cutoff
    /// radius weigh exactly zero.
    pub fn weight_at(&self, point: &GeoPoint) -> f64 {
        if point.distance_to(&self.centroid) > self.cutoff_radius {
            return 0.0;
        }

        let k = self.texture_frequency;
        let texture = (point.lat * k).sin() * (point.lng * k).cos();
        let mut weight = (texture + 1.0) * self.texture_amplitude;

        for hotspot in &self.hotspots {
            weight += self.hotspot_contribution(hotspot, point);
        }

        weight.clamp(0.0, 1.0)
    }

    /// Linear falloff: full `peak` at the centre, zero at `hotspot_radius`.
    pub fn hotspot_contribution(
        &self,
        hotspot: &Hotspot,
        point: &GeoPoint,
    ) -> f64 {
        let d = point.distance_to(&hotspot.position);
        if d < self.hotspot_radius {
            hotspot.peak * (1.0 - d / self.hotspot_radius)
        } else {
            0.0
        }
    }

    /// NaN weights are never visible.
    pub fn is_visible(&self, weight: f64) -> bool {
        weight > self.visibility_threshold
    }
}
