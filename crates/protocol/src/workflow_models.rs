//! Runtime workflow state models.
//!
//! These are the read-side projections the core hands to dashboards: the
//! ordered agent list with statuses, and the live operation lists of agent
//! runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::agent_models::{AgentName, AgentSnapshot};
use crate::operation_models::{Operation, OperationStatus};
use crate::payload_models::AgentPayload;

/// Phase of the step runner for one agent.
///
/// Idle -> Armed (operations loaded, all pending) -> Executing -> Finished.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    #[default]
    Idle,
    Armed,
    Executing,
    Finished,
}

/// Live view of one agent run and its operations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct AgentRun {
    /// Unique identifier of this run.
    ///
    /// Terminating and restarting an agent creates a new run with a new id,
    /// so late updates for a discarded run can be told apart.
    #[ts(type = "string")]
    pub id: Uuid,

    pub agent: AgentName,

    pub phase: RunPhase,

    /// Operations in execution order with their current statuses.
    pub operations: Vec<Operation>,

    #[ts(type = "string")]
    pub started_at: DateTime<Utc>,

    #[ts(type = "string | null")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Progress lines produced by this run.
    pub logs: Vec<String>,
}

impl AgentRun {
    /// True iff the run has at least one operation and all are completed.
    pub fn is_complete(&self) -> bool {
        !self.operations.is_empty()
            && self
                .operations
                .iter()
                .all(|op| op.status == OperationStatus::Completed)
    }

    /// Index of the operation currently running, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.operations
            .iter()
            .position(|op| op.status == OperationStatus::Running)
    }
}

/// Snapshot of the whole workflow.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct WorkflowState {
    /// Execution order of the selected agents.
    pub order: Vec<AgentName>,

    /// Agents in execution order, with statuses.
    pub agents: Vec<AgentSnapshot>,

    /// The agent awaiting user action, or `None` once all are completed.
    pub active: Option<AgentName>,

    /// Runs that have not been discarded yet.
    pub runs: Vec<AgentRun>,

    /// Payload of the last agent once the whole pipeline has completed.
    pub final_payload: Option<AgentPayload>,
}

impl WorkflowState {
    /// The workflow is complete when it has agents and none is active.
    pub fn is_complete(&self) -> bool {
        !self.agents.is_empty() && self.active.is_none()
    }
}
