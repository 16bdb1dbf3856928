use axum::{Json, extract::State};
use geocash_model::{DashboardResponse, HeatmapCollection};
use tracing::debug;

use crate::{errors::AppResult, infra::app_state::AppState};

/// Own network, competitors and heatmap in one payload.
///
/// Assembly is CPU-bound (grid generation, fallback synthesis) and runs on
/// the blocking pool. It never waits on the point-of-interest source.
pub async fn get_dashboard_handler(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardResponse>> {
    let assembler = state.assembler().clone();
    let response =
        tokio::task::spawn_blocking(move || assembler.assemble()).await?;

    debug!(
        own_network = response.own_network.len(),
        competitors = response.competitors.len(),
        cells = response.heatmap.len(),
        "dashboard assembled"
    );
    Ok(Json(response))
}

pub async fn get_heatmap_handler(
    State(state): State<AppState>,
) -> AppResult<Json<HeatmapCollection>> {
    let assembler = state.assembler().clone();
    let heatmap =
        tokio::task::spawn_blocking(move || assembler.heatmap()).await?;
    Ok(Json(heatmap))
}
