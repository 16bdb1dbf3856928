use geocash_model::PointOfInterest;

/// Case-insensitive substring match of the own-network brand token against
/// a point's bank and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandMatcher {
    token: String,
}

impl BrandMatcher {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            token: token.as_ref().trim().to_lowercase(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_own_network(&self, point: &PointOfInterest) -> bool {
        let haystack = format!(
            "{}{}",
            point.bank.to_lowercase(),
            point.name.to_lowercase()
        );
        haystack.contains(&self.token)
    }

    /// Splits `points` into `(own_network, competitors)`, preserving order.
    pub fn partition(
        &self,
        points: Vec<PointOfInterest>,
    ) -> (Vec<PointOfInterest>, Vec<PointOfInterest>) {
        points
            .into_iter()
            .partition(|point| self.is_own_network(point))
    }
}
