//! Global configuration models for `.sdlc-flow/config.toml`.
//!
//! This module defines the structure of the configuration file that controls
//! the default agent selection and the timing of simulated work.

use crate::agent_models::AgentName;
use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Represents global settings from `.sdlc-flow/config.toml`.
///
/// # Example
///
/// ```toml
/// # .sdlc-flow/config.toml
/// default-agents = ["Requirement Agent", "Design Agent"]
///
/// [timing]
/// min-operation-ms = 1000
/// max-operation-ms = 3000
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Agents preselected when the user has not chosen any.
    ///
    /// Kept as raw strings so that unknown names surface as a config
    /// validation error with the file path attached.
    #[serde(default = "default_agents")]
    pub default_agents: Vec<String>,

    /// Timing of the simulated work.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_agents: default_agents(),
            timing: TimingConfig::default(),
        }
    }
}

fn default_agents() -> Vec<String> {
    vec![
        AgentName::Requirement.to_string(),
        AgentName::Design.to_string(),
    ]
}

/// Delays applied by the simulated step runner, in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case", default)]
pub struct TimingConfig {
    /// Lower bound (inclusive) of the simulated duration of one operation.
    pub min_operation_ms: u64,

    /// Upper bound (exclusive) of the simulated duration of one operation.
    pub max_operation_ms: u64,

    /// Pause between Generate and the first operation.
    pub start_delay_ms: u64,

    /// Pause before the successor's control surface is opened.
    pub advance_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_operation_ms: 1000,
            max_operation_ms: 3000,
            start_delay_ms: 500,
            advance_delay_ms: 1000,
        }
    }
}

impl TimingConfig {
    /// Timing with every delay set to zero.
    pub fn immediate() -> Self {
        Self {
            min_operation_ms: 0,
            max_operation_ms: 0,
            start_delay_ms: 0,
            advance_delay_ms: 0,
        }
    }
}
