use geocash_model::GeoPoint;

/// Longitude stretch applied to hexagon vertices so tiles look regular on a
/// web map around 51°N. This is a visual correction, not a projection.
pub const DEFAULT_LNG_ASPECT: f64 = 1.65;

/// Flat-top hexagon packing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub radius: f64,
    pub lng_aspect: f64,
}

impl HexLayout {
    pub fn new(radius: f64, lng_aspect: f64) -> Self {
        Self { radius, lng_aspect }
    }

    pub fn with_radius(radius: f64) -> Self {
        Self::new(radius, DEFAULT_LNG_ASPECT)
    }

    /// A layout that would stall or divide by zero while tiling is rejected.
    pub fn is_valid(&self) -> bool {
        self.radius.is_finite()
            && self.radius > 0.0
            && self.lng_aspect.is_finite()
            && self.lng_aspect > 0.0
    }

    pub fn row_pitch(&self) -> f64 {
        1.5 * self.radius
    }

    pub fn column_pitch(&self) -> f64 {
        2.0 * self.radius * 60f64.to_radians().sin()
    }

    /// Closed ring of `[lng, lat]` pairs: six vertices at `60°·i − 30°`
    /// followed by the first vertex again.
    pub fn ring(&self, center: &GeoPoint) -> Vec<[f64; 2]> {
        let mut ring = Vec::with_capacity(7);
        for i in 0..6 {
            let angle = (60.0 * i as f64 - 30.0).to_radians();
            ring.push([
                center.lng + self.radius * angle.cos() * self.lng_aspect,
                center.lat + self.radius * angle.sin(),
            ]);
        }
        ring.push(ring[0]);
        ring
    }
}
