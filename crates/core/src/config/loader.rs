//! Configuration file loader for the `.sdlc-flow/` directory.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::AppConfig;
use sf_protocol::{AgentName, GlobalConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the project-local configuration directory.
pub const CONFIG_DIR: &str = ".sdlc-flow";

/// Loads configuration from `<root>/.sdlc-flow/config.toml`.
///
/// A missing directory or file yields the default configuration rather than
/// an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML
/// - A default agent is not one of the six agents, or the operation delay
///   range is inverted
///
/// # Example
///
/// ```rust,no_run
/// use sf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Default agents: {:?}", config.default_agents());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_path = root.join(CONFIG_DIR).join("config.toml");

    if !config_path.exists() {
        debug!(path = %config_path.display(), "no config file; using defaults");
        return Ok(AppConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let global: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    validate(&global, &config_path)?;

    debug!(path = %config_path.display(), "config loaded");
    Ok(AppConfig {
        global,
        source: Some(config_path),
    })
}

fn validate(global: &GlobalConfig, path: &Path) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidConfig {
        path: PathBuf::from(path),
        reason,
    };

    for name in &global.default_agents {
        name.parse::<AgentName>()
            .map_err(|e| invalid(format!("default-agents: {e}")))?;
    }

    let timing = &global.timing;
    if timing.min_operation_ms > timing.max_operation_ms {
        return Err(invalid(format!(
            "timing: min-operation-ms ({}) exceeds max-operation-ms ({})",
            timing.min_operation_ms, timing.max_operation_ms
        )));
    }

    Ok(())
}
