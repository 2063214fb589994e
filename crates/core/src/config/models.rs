//! Resolved application configuration.

use sf_protocol::{AgentName, GlobalConfig};
use std::path::PathBuf;

/// Configuration loaded from `.sdlc-flow/config.toml`, or defaults when the
/// file is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Settings from `config.toml`.
    pub global: GlobalConfig,

    /// The file the settings came from, if any.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// The configured default selection as agent names.
    ///
    /// Names are validated at load time, so unknown entries only appear in
    /// hand-built configs and are skipped.
    pub fn default_agents(&self) -> Vec<AgentName> {
        self.global
            .default_agents
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_is_requirement_and_design() {
        let config = AppConfig::default();
        assert_eq!(
            config.default_agents(),
            vec![AgentName::Requirement, AgentName::Design]
        );
        assert!(config.source.is_none());
    }

    #[test]
    fn test_unknown_default_agents_are_skipped() {
        let mut config = AppConfig::default();
        config.global.default_agents = vec!["Dev Agent".to_string(), "Nope".to_string()];
        assert_eq!(config.default_agents(), vec![AgentName::Dev]);
    }
}
