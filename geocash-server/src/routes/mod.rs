pub mod v1;

use axum::{Router, http::HeaderValue, routing::get};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{AppState, handlers};

/// Unversioned dashboard path kept for existing frontends.
pub const LEGACY_DASHBOARD: &str = "/api/dashboard";

/// Create the main API router with all versions
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", v1::create_v1_router())
        .route(LEGACY_DASHBOARD, get(handlers::get_dashboard_handler))
}

/// Full application: liveness routes, the versioned API, CORS and request
/// tracing.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state);

    Router::new()
        .route("/ping", get(handlers::ping_handler))
        .route("/health", get(handlers::health_handler))
        .merge(create_api_router())
        .fallback(handlers::not_found_handler)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let cors = &state.config().cors;
    if state.config().dev_mode || cors.is_permissive() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use geocash_config::Config;
    use geocash_core::{FetchError, PoiSource};
    use geocash_model::PointOfInterest;
    use tower::ServiceExt;

    use super::*;

    struct EmptySource;

    #[async_trait]
    impl PoiSource for EmptySource {
        async fn fetch_all(&self) -> Result<Vec<PointOfInterest>, FetchError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "empty"
        }
    }

    fn app_with(config: Config) -> Router {
        create_app(AppState::build(
            Arc::new(config),
            Arc::new(EmptySource),
            None,
        ))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/dashboard")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn empty_origin_list_allows_any_origin() {
        let response = app_with(Config::default())
            .oneshot(preflight("http://localhost:5173"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn configured_origins_are_echoed() {
        let mut config = Config::default();
        config.cors.allowed_origins =
            vec!["https://dashboard.example".to_string()];

        let response = app_with(config)
            .oneshot(preflight("https://dashboard.example"))
            .await
            .expect("response");

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://dashboard.example"
        );
    }
}
