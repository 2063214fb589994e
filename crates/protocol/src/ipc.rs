//! Inter-process communication protocol.
//!
//! This module defines the message types for asynchronous communication
//! between a front end (TUI, CLI or web UI) and the Core (workflow logic).
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from the front end to Core
//! - `Event`: Status updates sent from Core to the front end
//!
//! Communication is asynchronous and channel-based, allowing the UI to
//! remain responsive while simulated agent work is in progress.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::agent_models::{AgentName, AgentStatus};
use crate::operation_models::{Operation, OperationStatus};
use crate::payload_models::{AgentPayload, RunInput};
use crate::workflow_models::WorkflowState;

/// Operations sent from the front end to the Core logic.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "startAgent",
///   "payload": {
///     "agent": "Requirement Agent",
///     "input": { "project_name": "Foo", "document": "..." }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Finalize the agent selection and enter the workflow.
    ///
    /// Names are raw strings; unknown names are rejected with an
    /// `Error` event and leave the previous workflow untouched.
    SelectAgents { agents: Vec<String> },

    /// Generate/Process: start the step runner for an agent.
    StartAgent { agent: AgentName, input: RunInput },

    /// Roll back the agent's in-progress run.
    TerminateAgent { agent: AgentName },

    /// Close the agent's control surface, discarding a finished run.
    CloseAgent { agent: AgentName },

    /// Request a full snapshot of the workflow.
    GetWorkflowState,

    /// Leave the workflow: terminate any run and clear all state.
    Reset,

    /// Shut down the core loop.
    Shutdown,
}

/// Events sent from the Core logic to the front end.
///
/// ```json
/// {
///   "type": "agentStatusUpdate",
///   "payload": { "agent": "Design Agent", "status": "RUNNING" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A selection was accepted; agents are listed in execution order.
    WorkflowInitialized { order: Vec<AgentName> },

    /// An agent's status changed.
    AgentStatusUpdate { agent: AgentName, status: AgentStatus },

    /// The active marker moved. `None` means every agent has completed.
    ActiveAgentChanged { agent: Option<AgentName> },

    /// The front end should open this agent's control surface, prefilled
    /// with the predecessor's payload when there is one.
    OpenAgent {
        agent: AgentName,
        previous_payload: Option<AgentPayload>,
    },

    /// A run was armed with its operation list (all pending).
    OperationsLoaded {
        #[ts(type = "string")]
        run_id: Uuid,
        agent: AgentName,
        operations: Vec<Operation>,
    },

    /// One operation of a run changed status.
    OperationStatusUpdate {
        #[ts(type = "string")]
        run_id: Uuid,
        agent: AgentName,
        index: usize,
        status: OperationStatus,
    },

    /// A run produced a progress line.
    AgentLogChunk { agent: AgentName, content: String },

    /// An agent's stored payload was set or cleared.
    AgentPayloadUpdate {
        agent: AgentName,
        payload: Option<AgentPayload>,
    },

    /// An agent's run was rolled back by user request.
    AgentTerminated { agent: AgentName },

    /// Every agent in the execution order has completed.
    WorkflowCompleted { final_payload: Option<AgentPayload> },

    /// Reply to `GetWorkflowState`.
    WorkflowState { state: WorkflowState },

    /// The workflow was cleared by `Reset`.
    WorkflowReset,

    /// A request was rejected. No state was changed.
    Error { message: String },
}
