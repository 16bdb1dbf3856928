//! # GeoCash Server
//!
//! Axum surface for the GeoCash dashboard: the terminal map with own-network
//! detail, a competitor overlay and a demand heatmap over the city grid.
//! Terminal data is refreshed in the background and served from an
//! immutable snapshot, so no request waits on the upstream geodata API.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use routes::create_app;
