pub mod app_state;
pub mod shutdown;
pub mod startup;
