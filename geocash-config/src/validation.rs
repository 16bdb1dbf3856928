use geocash_core::grid::MAX_GRID_CELLS;
use geocash_model::GeoBounds;
use thiserror::Error;
use tracing::warn;

use crate::models::{Config, MAX_TRAFFIC_BATCH_LIMIT};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("invalid grid configuration: {reason}")]
    InvalidGrid { reason: String },
    #[error("{field} bounds must span a positive, finite area")]
    InvalidBounds { field: &'static str },
    #[error("network brand token must not be empty")]
    EmptyBrandToken,
    #[error("fallback bank roster must not be empty")]
    EmptyBankRoster,
    #[error("{field} range must satisfy min < max")]
    InvalidRange { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Logs every warning at `warn` level. Call after the subscriber is
    /// installed.
    pub fn emit(&self) {
        for warning in &self.items {
            match &warning.hint {
                Some(hint) => {
                    warn!(warning = %warning.message, hint = %hint, "configuration warning")
                }
                None => warn!(warning = %warning.message, "configuration warning"),
            }
        }
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    validate_grid(config)?;
    require_bounds("source", &config.source.bounds)?;
    require_bounds("fallback", &config.fallback.bounds)?;

    if config.network.brand_token.trim().is_empty() {
        return Err(ConfigGuardRailError::EmptyBrandToken);
    }
    if config.fallback.count > 0 && config.fallback.banks.is_empty() {
        return Err(ConfigGuardRailError::EmptyBankRoster);
    }
    if !config.fallback.withdrawal_flow.is_valid() {
        return Err(ConfigGuardRailError::InvalidRange {
            field: "fallback.withdrawal_flow",
        });
    }
    if !config.fallback.deposit_flow.is_valid() {
        return Err(ConfigGuardRailError::InvalidRange {
            field: "fallback.deposit_flow",
        });
    }
    if config.source.timeout.is_zero() {
        return Err(ConfigGuardRailError::NotPositive {
            field: "source.timeout",
        });
    }
    if config.traffic.batch_limit == 0 {
        return Err(ConfigGuardRailError::NotPositive {
            field: "traffic.batch_limit",
        });
    }
    if config.traffic.batch_limit > MAX_TRAFFIC_BATCH_LIMIT {
        return Err(ConfigGuardRailError::TooLarge {
            field: "traffic.batch_limit",
            value: config.traffic.batch_limit,
            max: MAX_TRAFFIC_BATCH_LIMIT,
        });
    }

    if !config.has_database() {
        warnings.push_with_hint(
            "No database configured; traffic ingestion is disabled",
            "Set DATABASE_URL or DB_HOST/DB_USER/DB_NAME to enable it",
        );
    }

    if !config.source.enabled {
        warnings.push(
            "Point-of-interest source disabled; the dashboard will only serve fallback competitors",
        );
    }

    if let Some(interval) = config.refresh.interval
        && interval < config.source.timeout
    {
        warnings.push_with_hint(
            format!(
                "Refresh interval {} is shorter than the source timeout {}",
                humantime::format_duration(interval),
                humantime::format_duration(config.source.timeout),
            ),
            "Slow fetches will delay the next tick; raise REFRESH_INTERVAL",
        );
    }

    if config.fallback.count == 0 {
        warnings.push(
            "Fallback competitor count is zero; the dashboard shows no competitors until the first refresh",
        );
    }

    Ok(warnings)
}

fn validate_grid(config: &Config) -> Result<(), ConfigGuardRailError> {
    let grid = &config.grid;
    if !(grid.cell_radius.is_finite() && grid.cell_radius > 0.0) {
        return Err(ConfigGuardRailError::InvalidGrid {
            reason: format!("cell_radius must be positive, got {}", grid.cell_radius),
        });
    }
    if !(grid.lng_aspect.is_finite() && grid.lng_aspect > 0.0) {
        return Err(ConfigGuardRailError::InvalidGrid {
            reason: format!("lng_aspect must be positive, got {}", grid.lng_aspect),
        });
    }
    if !(grid.model.hotspot_radius.is_finite() && grid.model.hotspot_radius > 0.0)
    {
        return Err(ConfigGuardRailError::InvalidGrid {
            reason: "model.hotspot_radius must be positive".into(),
        });
    }
    require_bounds("grid", &grid.bounds)?;

    let estimated = grid.estimated_cells();
    if estimated > MAX_GRID_CELLS {
        return Err(ConfigGuardRailError::InvalidGrid {
            reason: format!(
                "cell_radius {} tiles about {estimated:.0} cells, limit is {MAX_GRID_CELLS:.0}",
                grid.cell_radius
            ),
        });
    }
    Ok(())
}

fn require_bounds(
    field: &'static str,
    bounds: &GeoBounds,
) -> Result<(), ConfigGuardRailError> {
    if bounds.is_well_formed() {
        Ok(())
    } else {
        Err(ConfigGuardRailError::InvalidBounds { field })
    }
}
