//! Configuration loading and management.
//!
//! This module loads the optional `.sdlc-flow/config.toml` file holding the
//! default agent selection and the simulated timing.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;
