//! Client-side mirror of the workflow, rebuilt from core events.

use sf_protocol::{
    AgentName, AgentPayload, AgentRun, AgentSnapshot, AgentStatus, OperationStatus, RunPhase,
    WorkflowState,
};
use std::collections::BTreeMap;

/// Maximum number of characters shown when previewing a carried-over payload.
pub const PREVIEW_CHARS: usize = 200;

/// What the UI knows about the workflow.
#[derive(Debug, Default, Clone)]
pub struct WorkflowView {
    /// Agents in execution order with their statuses.
    pub agents: Vec<AgentSnapshot>,
    pub active: Option<AgentName>,

    /// Loaded operation lists, keyed by agent.
    pub runs: BTreeMap<AgentName, AgentRun>,

    /// Latest payload reported for each agent.
    pub payloads: BTreeMap<AgentName, AgentPayload>,

    /// Agent whose control surface is open, with the payload it will
    /// work from.
    pub open: Option<OpenSurface>,

    pub final_payload: Option<AgentPayload>,

    /// Project name and document typed in for the first agent.
    pub draft: Draft,

    /// Last notice for the status line.
    pub notice: Option<String>,
}

/// An open agent control surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSurface {
    pub agent: AgentName,
    pub previous_payload: Option<AgentPayload>,
}

/// User input collected for the first agent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Draft {
    pub project_name: String,
    pub document: Option<String>,
    /// Where the document was loaded from, for display.
    pub document_source: Option<String>,
}

impl WorkflowView {
    /// Replace everything with a fresh workflow over `order`.
    pub fn initialize(&mut self, order: Vec<AgentName>) {
        self.agents = order
            .into_iter()
            .map(|name| AgentSnapshot {
                name,
                status: AgentStatus::Pending,
                is_active: false,
            })
            .collect();
        self.active = None;
        self.runs.clear();
        self.payloads.clear();
        self.open = None;
        self.final_payload = None;
    }

    /// Adopt a full snapshot from the core.
    pub fn apply_state(&mut self, state: WorkflowState) {
        self.agents = state.agents;
        self.active = state.active;
        self.runs = state.runs.into_iter().map(|run| (run.agent, run)).collect();
        self.final_payload = state.final_payload;
    }

    pub fn clear(&mut self) {
        self.initialize(Vec::new());
    }

    pub fn set_status(&mut self, agent: AgentName, status: AgentStatus) {
        if let Some(snapshot) = self.agents.iter_mut().find(|a| a.name == agent) {
            snapshot.status = status;
        }
    }

    pub fn set_active(&mut self, active: Option<AgentName>) {
        self.active = active;
        for snapshot in &mut self.agents {
            snapshot.is_active = Some(snapshot.name) == active;
        }
    }

    pub fn status(&self, agent: AgentName) -> Option<AgentStatus> {
        self.agents.iter().find(|a| a.name == agent).map(|a| a.status)
    }

    pub fn is_first(&self, agent: AgentName) -> bool {
        self.agents.first().map(|a| a.name) == Some(agent)
    }

    pub fn running_agent(&self) -> Option<AgentName> {
        self.agents
            .iter()
            .find(|a| a.status == AgentStatus::Running)
            .map(|a| a.name)
    }

    /// Agent at `index` of the execution order.
    pub fn agent_at(&self, index: usize) -> Option<AgentName> {
        self.agents.get(index).map(|a| a.name)
    }

    /// `(completed, total)` operations of the agent's loaded run.
    pub fn progress(&self, agent: AgentName) -> Option<(usize, usize)> {
        let run = self.runs.get(&agent)?;
        let done = run
            .operations
            .iter()
            .filter(|op| op.status == OperationStatus::Completed)
            .count();
        Some((done, run.operations.len()))
    }

    /// Whether the agent has a run that is armed or executing.
    pub fn is_in_flight(&self, agent: AgentName) -> bool {
        self.runs
            .get(&agent)
            .is_some_and(|run| matches!(run.phase, RunPhase::Armed | RunPhase::Executing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_resets_everything() {
        let mut view = WorkflowView::default();
        view.final_payload = Some(AgentPayload {
            project_name: "Foo".to_string(),
            original_document: "D".to_string(),
            generated_document: "G".to_string(),
        });

        view.initialize(vec![AgentName::Requirement, AgentName::Design]);

        assert_eq!(view.agents.len(), 2);
        assert!(view.final_payload.is_none());
        assert!(view.is_first(AgentName::Requirement));
        assert!(!view.is_first(AgentName::Design));
    }

    #[test]
    fn test_set_active_marks_one_agent() {
        let mut view = WorkflowView::default();
        view.initialize(vec![AgentName::Requirement, AgentName::Design]);

        view.set_active(Some(AgentName::Design));

        assert!(!view.agents[0].is_active);
        assert!(view.agents[1].is_active);

        view.set_active(None);
        assert!(view.agents.iter().all(|a| !a.is_active));
    }

    #[test]
    fn test_draft_survives_reinitialize() {
        let mut view = WorkflowView::default();
        view.draft.project_name = "Foo".to_string();

        view.initialize(vec![AgentName::Dev]);

        assert_eq!(view.draft.project_name, "Foo");
    }
}
