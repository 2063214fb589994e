//! Agent identity and status models.
//!
//! The pipeline only knows six agents, one per SDLC phase. Their canonical
//! phase order is encoded in the declaration order of [`AgentName`], so sorting
//! a selection by `AgentName` yields the execution order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

/// One of the six canonical SDLC agents.
///
/// Variants are declared in canonical phase order:
/// Requirement -> Design -> Dev -> Test -> Deploy -> Monitor.
/// The derived `Ord` therefore sorts agents into execution order.
///
/// Serialized with the full display name used by the UI:
/// ```json
/// "Requirement Agent"
/// ```
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS,
)]
pub enum AgentName {
    #[serde(rename = "Requirement Agent")]
    Requirement,
    #[serde(rename = "Design Agent")]
    Design,
    #[serde(rename = "Dev Agent")]
    Dev,
    #[serde(rename = "Test Agent")]
    Test,
    #[serde(rename = "Deploy Agent")]
    Deploy,
    #[serde(rename = "Monitor Agent")]
    Monitor,
}

/// Error returned when a string does not name one of the canonical agents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl AgentName {
    /// All agents in canonical phase order.
    pub const ALL: [AgentName; 6] = [
        AgentName::Requirement,
        AgentName::Design,
        AgentName::Dev,
        AgentName::Test,
        AgentName::Deploy,
        AgentName::Monitor,
    ];

    /// Zero-based index of this agent in the canonical phase sequence.
    pub fn phase_index(self) -> usize {
        self as usize
    }

    /// Full display name, e.g. `"Requirement Agent"`.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Requirement => "Requirement Agent",
            Self::Design => "Design Agent",
            Self::Dev => "Dev Agent",
            Self::Test => "Test Agent",
            Self::Deploy => "Deploy Agent",
            Self::Monitor => "Monitor Agent",
        }
    }

    /// Display name without the trailing " Agent", as shown on pipeline cards.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Requirement => "Requirement",
            Self::Design => "Design",
            Self::Dev => "Dev",
            Self::Test => "Test",
            Self::Deploy => "Deploy",
            Self::Monitor => "Monitor",
        }
    }

    /// One-line description shown in the agent selection list.
    pub fn description(self) -> &'static str {
        match self {
            Self::Requirement => "Analyze project requirements",
            Self::Design => "Create UI/UX designs",
            Self::Dev => "Generate code",
            Self::Test => "Execute tests",
            Self::Deploy => "Handle deployment",
            Self::Monitor => "Monitor performance",
        }
    }

    pub fn category(self) -> AgentCategory {
        match self {
            Self::Requirement => AgentCategory::Planning,
            Self::Design => AgentCategory::Design,
            Self::Dev => AgentCategory::Development,
            Self::Test => AgentCategory::Quality,
            Self::Deploy | Self::Monitor => AgentCategory::Operations,
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AgentName {
    type Err = UnknownAgent;

    /// Parses either the full name (`"Design Agent"`) or the short name
    /// (`"design"`). Matching ignores ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|agent| {
                agent.display_name().eq_ignore_ascii_case(trimmed)
                    || agent.short_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}

/// Grouping used by the selection surface.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentCategory {
    Planning,
    Design,
    Development,
    Quality,
    Operations,
}

/// Lifecycle status of one agent within a workflow session.
///
/// Normal progression is Pending -> Running -> Completed. Terminating a
/// running agent sends it back to Pending. Failed is only reached when an
/// operation reports a failed outcome.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

/// Point-in-time view of one agent, as consumed by the workflow visualization.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AgentSnapshot {
    pub name: AgentName,
    pub status: AgentStatus,
    /// True iff this is the next agent awaiting user action.
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_declaration() {
        let mut shuffled = vec![
            AgentName::Monitor,
            AgentName::Design,
            AgentName::Requirement,
            AgentName::Deploy,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                AgentName::Requirement,
                AgentName::Design,
                AgentName::Deploy,
                AgentName::Monitor,
            ]
        );
        assert_eq!(AgentName::Requirement.phase_index(), 0);
        assert_eq!(AgentName::Monitor.phase_index(), 5);
    }

    #[test]
    fn test_parse_full_and_short_names() {
        assert_eq!("Design Agent".parse::<AgentName>(), Ok(AgentName::Design));
        assert_eq!("dev".parse::<AgentName>(), Ok(AgentName::Dev));
        assert_eq!("  TEST agent ".parse::<AgentName>(), Ok(AgentName::Test));
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "Security Agent".parse::<AgentName>().unwrap_err();
        assert_eq!(err, UnknownAgent("Security Agent".to_string()));
        assert_eq!(err.to_string(), "Unknown agent: Security Agent");
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for agent in AgentName::ALL {
            assert_eq!(agent.to_string().parse::<AgentName>(), Ok(agent));
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(AgentName::Requirement.category(), AgentCategory::Planning);
        assert_eq!(AgentName::Deploy.category(), AgentCategory::Operations);
        assert_eq!(AgentName::Monitor.category(), AgentCategory::Operations);
    }
}
