use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

pub async fn ping_handler() -> Json<Value> {
    info!("Ping endpoint called");
    Json(json!({
        "status": "ok",
        "message": "GeoCash dashboard is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn health_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    let snapshot = state.cache().current_snapshot();

    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "snapshot": {
                "populated": snapshot.is_populated(),
                "generatedAt": snapshot.generated_at.map(|at| at.to_rfc3339()),
                "ownNetwork": snapshot.own_network.len(),
                "competitors": snapshot.competitors.len(),
            },
            "source": {
                "enabled": state.config().source.enabled,
                "endpoint": state.config().source.endpoint.as_str(),
            }
        }
    });

    match state.postgres() {
        Some(pool) => {
            if let Err(err) = sqlx::query("SELECT 1").execute(pool).await {
                return Err(AppError::service_unavailable(format!(
                    "database unreachable: {err}"
                )));
            }
            health_status["checks"]["database"] = json!({
                "configured": true,
                "status": "healthy"
            });
        }
        None => {
            health_status["checks"]["database"] = json!({
                "configured": false
            });
        }
    }

    Ok(Json(health_status))
}

pub async fn not_found_handler() -> AppError {
    AppError::not_found("No such route")
}
