//! Scripted executor for testing and dry runs.

use crate::agents::base::OperationExecutor;
use async_trait::async_trait;
use sf_protocol::{AgentName, Operation, OperationOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Completes immediately with a preset outcome per operation.
///
/// Operations without a scripted outcome complete. Every call is recorded
/// so tests can check execution order.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    outcomes: HashMap<(AgentName, String), OperationOutcome>,
    executed: Arc<Mutex<Vec<(AgentName, String)>>>,
}

impl ScriptedExecutor {
    pub fn success() -> Self {
        Self::default()
    }

    /// Fail the operation with title `title` of `agent`.
    pub fn failing_at(agent: AgentName, title: &str, reason: &str) -> Self {
        Self::default().with_outcome(agent, title, OperationOutcome::Failed(reason.to_string()))
    }

    pub fn with_outcome(
        mut self,
        agent: AgentName,
        title: &str,
        outcome: OperationOutcome,
    ) -> Self {
        self.outcomes.insert((agent, title.to_string()), outcome);
        self
    }

    /// `(agent, operation title)` pairs in the order they were executed.
    pub fn executed(&self) -> Vec<(AgentName, String)> {
        self.executed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OperationExecutor for ScriptedExecutor {
    async fn execute(&self, agent: AgentName, operation: &Operation) -> OperationOutcome {
        if let Ok(mut log) = self.executed.lock() {
            log.push((agent, operation.title.clone()));
        }
        tokio::task::yield_now().await;

        self.outcomes
            .get(&(agent, operation.title.clone()))
            .cloned()
            .unwrap_or(OperationOutcome::Completed)
    }
}
