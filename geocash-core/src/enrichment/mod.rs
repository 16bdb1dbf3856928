//! Simulated operational data.
//!
//! Own-network terminals get two cassettes, complaints, balance figures and
//! an efficiency verdict. Competitors only ever get estimated flows, and
//! only when the dashboard has to invent them.

pub mod fallback;
pub mod profile;
pub mod simulated;
pub mod status;

use std::fmt;

use geocash_model::Terminal;

pub use fallback::{AmountRange, FallbackSettings};
pub use profile::OperationalProfile;
pub use simulated::SimulatedEnricher;

/// Source of simulated terminal detail. Enrichment is pure computation over
/// already-valid input and cannot fail.
pub trait Enricher: fmt::Debug + Send + Sync {
    /// Returns `terminal` marked as own network with full operational detail.
    fn enrich_own_network(&self, terminal: Terminal) -> Terminal;

    /// Fabricates `count` competitor terminals carrying estimated flows only.
    fn generate_fallback_competitors(&self, count: usize) -> Vec<Terminal>;
}
