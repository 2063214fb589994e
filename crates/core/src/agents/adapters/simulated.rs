//! Executor that simulates work with a random delay.

use crate::agents::base::{DelayPolicy, OperationExecutor, Scheduler, TokioScheduler};
use async_trait::async_trait;
use sf_protocol::{AgentName, Operation, OperationOutcome};
use std::sync::Arc;
use tracing::trace;

/// Waits for a duration drawn from its `DelayPolicy`, then reports success.
///
/// No real computation happens and the outcome is always `Completed`.
#[derive(Clone)]
pub struct SimulatedExecutor {
    delay: DelayPolicy,
    scheduler: Arc<dyn Scheduler>,
}

impl SimulatedExecutor {
    pub fn new(delay: DelayPolicy, scheduler: Arc<dyn Scheduler>) -> Self {
        Self { delay, scheduler }
    }

    /// Simulated executor on the tokio timer.
    pub fn with_delay(delay: DelayPolicy) -> Self {
        Self::new(delay, Arc::new(TokioScheduler))
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::with_delay(DelayPolicy::default())
    }
}

#[async_trait]
impl OperationExecutor for SimulatedExecutor {
    async fn execute(&self, agent: AgentName, operation: &Operation) -> OperationOutcome {
        let duration = self.delay.sample();
        trace!(%agent, operation = %operation.title, ?duration, "simulating operation");
        self.scheduler.sleep(duration).await;
        OperationOutcome::Completed
    }
}
