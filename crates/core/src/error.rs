//! Error types for workflow orchestration.
//!
//! Every error here is returned before any state is mutated, so the caller
//! can recover by correcting the request.

use sf_protocol::{AgentName, AgentStatus};
use thiserror::Error;

/// Errors returned by the sequencer, the step runner and the workflow manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A selection named an agent outside the six canonical agents.
    #[error("Invalid agent: {0}")]
    InvalidAgent(String),

    /// The agent is canonical but not part of the current execution order.
    #[error("{0} is not part of the current workflow")]
    NotInWorkflow(AgentName),

    /// Start was requested without the input the agent needs.
    #[error("Cannot start {agent}: {reason}")]
    PreconditionNotMet { agent: AgentName, reason: String },

    /// Another agent is already executing.
    #[error("{running} is already running")]
    AgentBusy { running: AgentName },

    /// Terminate was requested for an agent with no run in progress.
    #[error("{0} has no run in progress")]
    NotExecuting(AgentName),

    /// A status change would break the agent lifecycle.
    #[error("Invalid status transition for {agent}: {from:?} -> {to:?}")]
    InvalidTransition {
        agent: AgentName,
        from: AgentStatus,
        to: AgentStatus,
    },
}

/// Type alias for Result with WorkflowError.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl WorkflowError {
    pub(crate) fn precondition(agent: AgentName, reason: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            agent,
            reason: reason.into(),
        }
    }
}
