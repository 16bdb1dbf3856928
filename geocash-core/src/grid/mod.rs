//! Hex-grid heatmap generation.
//!
//! [`generate_heatmap`] tiles a bounding box with flat-top hexagons, scores
//! every cell centre with a [`WeightModel`] and keeps only visible cells. It
//! is a pure function: identical inputs always yield identical cells, vertex
//! for vertex.

pub mod layout;
pub mod weight;

use geocash_model::{GeoBounds, GeoPoint, HeatmapCollection, HexCell};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use layout::{DEFAULT_LNG_ASPECT, HexLayout};
pub use weight::{Hotspot, WeightModel};

/// Tiles `bounds` and returns the visible cells in row-major order.
///
/// Rows start at `bounds.min_lat` and advance by the row pitch while the row
/// latitude is strictly below `bounds.max_lat`; columns behave the same on
/// longitude, with odd rows shifted by half a column pitch. Malformed bounds
/// or layouts produce an empty heatmap.
pub fn generate_heatmap(
    bounds: &GeoBounds,
    layout: HexLayout,
    model: &WeightModel,
) -> Vec<HexCell> {
    if !bounds.is_well_formed() || !layout.is_valid() {
        return Vec::new();
    }

    let rows = steps_below(bounds.min_lat, bounds.max_lat, layout.row_pitch());

    // Rows are independent; collecting keeps them in index order.
    let per_row: Vec<Vec<HexCell>> = (0..rows)
        .into_par_iter()
        .map(|row| row_cells(bounds, layout, model, row))
        .collect();

    per_row.into_iter().flatten().collect()
}

fn row_cells(
    bounds: &GeoBounds,
    layout: HexLayout,
    model: &WeightModel,
    row: usize,
) -> Vec<HexCell> {
    let lat = bounds.min_lat + row as f64 * layout.row_pitch();
    let column_pitch = layout.column_pitch();
    let start_lng = if row % 2 == 1 {
        bounds.min_lng + column_pitch / 2.0
    } else {
        bounds.min_lng
    };

    let columns = steps_below(start_lng, bounds.max_lng, column_pitch);
    let mut cells = Vec::new();
    for column in 0..columns {
        let center = GeoPoint::new(lat, start_lng + column as f64 * column_pitch);
        let weight = model.weight_at(&center);
        if model.is_visible(weight) {
            cells.push(HexCell {
                center,
                ring: layout.ring(&center),
                weight,
            });
        }
    }
    cells
}

/// Number of values `start + i·pitch` strictly below `end`.
fn steps_below(start: f64, end: f64, pitch: f64) -> usize {
    let mut steps = 0usize;
    while start + steps as f64 * pitch < end {
        steps += 1;
    }
    steps
}

/// Upper bound on cells per heatmap; every dashboard request tiles the grid.
pub const MAX_GRID_CELLS: f64 = 1_000_000.0;

/// Everything the dashboard needs to rebuild its heatmap on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub bounds: GeoBounds,
    pub cell_radius: f64,
    pub lng_aspect: f64,
    pub model: WeightModel,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            bounds: GeoBounds::new(51.00, 51.30, 71.30, 71.65),
            cell_radius: 0.002,
            lng_aspect: DEFAULT_LNG_ASPECT,
            model: WeightModel::default(),
        }
    }
}

impl GridSettings {
    pub fn layout(&self) -> HexLayout {
        HexLayout::new(self.cell_radius, self.lng_aspect)
    }

    /// Rough count of cells tiled per request: rows times columns over the
    /// bounds. Infinite when the layout cannot tile.
    pub fn estimated_cells(&self) -> f64 {
        let layout = self.layout();
        if !layout.is_valid() {
            return f64::INFINITY;
        }
        let rows = (self.bounds.max_lat - self.bounds.min_lat) / layout.row_pitch();
        let columns =
            (self.bounds.max_lng - self.bounds.min_lng) / layout.column_pitch();
        rows.max(0.0).ceil() * columns.max(0.0).ceil()
    }
}

/// Stateless heatmap generator bound to one set of grid settings.
#[derive(Debug, Clone)]
pub struct GridEngine {
    settings: GridSettings,
}

impl GridEngine {
    pub fn new(settings: GridSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn generate_heatmap(&self) -> Vec<HexCell> {
        generate_heatmap(
            &self.settings.bounds,
            self.settings.layout(),
            &self.settings.model,
        )
    }

    pub fn heatmap_collection(&self) -> HeatmapCollection {
        self.generate_heatmap().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emitted_cells_are_visible_and_bounded() {
        let engine = GridEngine::new(GridSettings::default());
        let cells = engine.generate_heatmap();

        assert!(!cells.is_empty());
        for cell in &cells {
            assert!(cell.weight > 0.05 && cell.weight <= 1.0, "{}", cell.weight);
            assert_eq!(cell.ring.len(), 7);
        }
    }

    #[test]
    fn default_grid_estimate_is_modest() {
        let settings = GridSettings::default();
        let estimate = settings.estimated_cells();
        assert!(estimate > 5_000.0 && estimate < 20_000.0, "{estimate}");

        let tiny = GridSettings {
            cell_radius: 1e-7,
            ..GridSettings::default()
        };
        assert!(tiny.estimated_cells() > MAX_GRID_CELLS);
    }

    #[test]
    fn generation_is_deterministic() {
        let settings = GridSettings::default();
        let first =
            generate_heatmap(&settings.bounds, settings.layout(), &settings.model);
        let second =
            generate_heatmap(&settings.bounds, settings.layout(), &settings.model);
        assert_eq!(first, second);
    }

    #[test]
    fn centres_stay_strictly_inside_upper_bounds() {
        let settings = GridSettings::default();
        for cell in GridEngine::new(settings.clone()).generate_heatmap() {
            assert!(cell.center.lat < settings.bounds.max_lat);
            assert!(cell.center.lng < settings.bounds.max_lng);
            assert!(cell.center.lat >= settings.bounds.min_lat);
            assert!(cell.center.lng >= settings.bounds.min_lng);
        }
    }

    #[test]
    fn odd_rows_are_offset_by_half_a_column() {
        let layout = HexLayout::with_radius(0.01);
        let model = WeightModel {
            centroid: GeoPoint::new(0.0, 0.0),
            cutoff_radius: 10.0,
            texture_amplitude: 0.5,
            texture_frequency: 0.0,
            hotspots: Vec::new(),
            ..WeightModel::default()
        };
        let bounds = GeoBounds::new(0.0, 0.025, 0.0, 0.05);
        let cells = generate_heatmap(&bounds, layout, &model);

        let row0: Vec<_> = cells.iter().filter(|c| c.center.lat == 0.0).collect();
        let row1: Vec<_> = cells
            .iter()
            .filter(|c| (c.center.lat - layout.row_pitch()).abs() < 1e-12)
            .collect();
        assert_eq!(row0[0].center.lng, 0.0);
        assert!((row1[0].center.lng - layout.column_pitch() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn exclusive_upper_bound_drops_exact_hits() {
        // With pitch 0.5 the value 1.0 is reached exactly and must not count.
        assert_eq!(steps_below(0.0, 1.0, 0.5), 2);
        assert_eq!(steps_below(0.0, 1.01, 0.5), 3);
        assert_eq!(steps_below(1.0, 1.0, 0.5), 0);
    }

    #[test]
    fn degenerate_inputs_yield_empty_heatmap() {
        let model = WeightModel::default();
        let inverted = GeoBounds::new(51.3, 51.0, 71.3, 71.65);
        assert!(
            generate_heatmap(&inverted, HexLayout::with_radius(0.002), &model)
                .is_empty()
        );

        let bounds = GridSettings::default().bounds;
        assert!(
            generate_heatmap(&bounds, HexLayout::with_radius(0.0), &model)
                .is_empty()
        );
    }

    #[test]
    fn cells_outside_cutoff_never_appear() {
        let settings = GridSettings::default();
        let model = &settings.model;
        for cell in GridEngine::new(settings.clone()).generate_heatmap() {
            assert!(cell.center.distance_to(&model.centroid) <= model.cutoff_radius);
        }
    }
}
