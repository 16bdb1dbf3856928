//! Configuration for the GeoCash dashboard.
//!
//! Values are layered: explicit CLI overrides, then environment variables
//! (optionally read from a `.env` file), then a TOML file, then built-in
//! defaults. [`ConfigLoader::load`] returns the composed [`Config`] together
//! with non-fatal [`ConfigWarnings`]; unusable values are rejected by the
//! guard rails in [`validation`].
#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod sources;
pub mod util;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError,
};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, NetworkConfig,
    RefreshConfig, ServerConfig, SourceConfig, TrafficConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
