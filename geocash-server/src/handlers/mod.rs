pub mod dashboard;
pub mod health;

pub use dashboard::{get_dashboard_handler, get_heatmap_handler};
pub use health::{health_handler, not_found_handler, ping_handler};
