//! Hand-off data passed between pipeline steps.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Output of a completed agent, consumed by its successor as input.
///
/// The sequencer stores one payload per agent. Agent N's payload becomes
/// visible to agent N+1 only after agent N has completed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AgentPayload {
    pub project_name: String,

    /// The document this agent worked from: the uploaded document for the
    /// first agent, otherwise the predecessor's generated document.
    pub original_document: String,

    /// Output synthesized by this agent.
    pub generated_document: String,
}

impl AgentPayload {
    /// First `limit` characters of the generated document, with `...`
    /// appended when the document was truncated.
    pub fn preview(&self, limit: usize) -> String {
        let mut chars = self.generated_document.chars();
        let head: String = chars.by_ref().take(limit).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// User input supplied when starting an agent.
///
/// Only the first agent of the execution order reads these fields; every
/// later agent works from its predecessor's payload and can be started with
/// [`RunInput::carry_over`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct RunInput {
    pub project_name: String,

    /// Document text. `None` means no document has been supplied yet.
    #[serde(default)]
    pub document: Option<String>,
}

impl RunInput {
    pub fn new(project_name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            document: Some(document.into()),
        }
    }

    /// Input for agents that confirm the carried-over payload.
    pub fn carry_over() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(generated: &str) -> AgentPayload {
        AgentPayload {
            project_name: "Foo".to_string(),
            original_document: "D".to_string(),
            generated_document: generated.to_string(),
        }
    }

    #[test]
    fn test_preview_short_document_is_unchanged() {
        assert_eq!(payload("short").preview(200), "short");
    }

    #[test]
    fn test_preview_truncates_long_document() {
        let long = "x".repeat(250);
        let preview = payload(&long).preview(200);
        assert_eq!(preview.len(), 203);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_preview_exact_length_has_no_ellipsis() {
        let exact = "y".repeat(200);
        assert_eq!(payload(&exact).preview(200), exact);
    }

    #[test]
    fn test_carry_over_input_is_empty() {
        let input = RunInput::carry_over();
        assert!(input.project_name.is_empty());
        assert!(input.document.is_none());
    }
}
