use axum::{Router, routing::get};

use crate::{AppState, handlers};

pub const DASHBOARD: &str = "/dashboard";
pub const HEATMAP: &str = "/heatmap";

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(DASHBOARD, get(handlers::get_dashboard_handler))
        .route(HEATMAP, get(handlers::get_heatmap_handler))
}
