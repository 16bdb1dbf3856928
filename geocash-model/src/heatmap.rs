#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// One hexagonal heatmap tile. The ring is closed: seven `[lng, lat]` pairs,
/// the last repeating the first.
#[derive(Debug, Clone, PartialEq)]
pub struct HexCell {
    pub center: GeoPoint,
    pub ring: Vec<[f64; 2]>,
    pub weight: f64,
}

/// GeoJSON `FeatureCollection` of heatmap polygons, the shape consumed by
/// the dashboard front end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeatmapCollection {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub features: Vec<HeatmapFeature>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeatmapFeature {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub properties: HeatmapProperties,
    pub geometry: PolygonGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeatmapProperties {
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonGeometry {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl HeatmapCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for HeatmapCollection {
    fn default() -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }
}

impl From<HexCell> for HeatmapFeature {
    fn from(cell: HexCell) -> Self {
        Self {
            kind: "Feature".to_string(),
            properties: HeatmapProperties {
                weight: cell.weight,
            },
            geometry: PolygonGeometry {
                kind: "Polygon".to_string(),
                coordinates: vec![cell.ring],
            },
        }
    }
}

impl FromIterator<HexCell> for HeatmapCollection {
    fn from_iter<I: IntoIterator<Item = HexCell>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().map(HeatmapFeature::from).collect(),
            ..Self::default()
        }
    }
}
