//! Step runner.
//!
//! The StepRunner executes the operations of one started agent strictly in
//! order, reports each transition as an event, and on completion hands the
//! agent's payload to the sequencer, which unlocks the successor.

use crate::agents::base::{OperationExecutor, Scheduler};
use crate::agents::catalog::generated_document;
use crate::sequencer::Advance;
use crate::state::manager::WorkflowInner;
use crate::state::run::{begin_execution, finish_run, log_to_run, set_operation_status};
use sf_protocol::{
    AgentName, AgentPayload, AgentStatus, Event, OperationOutcome, OperationStatus, RunPhase,
    TimingConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// What an agent works from, fixed at start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSeed {
    pub project_name: String,
    pub original_document: String,
}

/// Drives a single agent run from armed to finished.
pub struct StepRunner {
    executor: Arc<dyn OperationExecutor>,
    scheduler: Arc<dyn Scheduler>,
    timing: TimingConfig,
    events_tx: Sender<Event>,
}

impl StepRunner {
    pub fn new(
        executor: Arc<dyn OperationExecutor>,
        scheduler: Arc<dyn Scheduler>,
        timing: TimingConfig,
        events_tx: Sender<Event>,
    ) -> Self {
        Self {
            executor,
            scheduler,
            timing,
            events_tx,
        }
    }

    /// Execute the armed run `run_id` of `agent`.
    ///
    /// The shared state is locked only around transitions, never across the
    /// executor or a scheduler sleep. After every suspension the run is
    /// looked up again; if it was terminated or reset in the meantime the
    /// runner stops without touching anything.
    pub(crate) async fn run(
        &self,
        shared: Arc<Mutex<WorkflowInner>>,
        agent: AgentName,
        run_id: Uuid,
        seed: RunSeed,
    ) {
        self.scheduler
            .sleep(Duration::from_millis(self.timing.start_delay_ms))
            .await;

        let operation_count = {
            let mut inner = shared.lock().await;
            let Some(run) = current_run(&mut inner, agent, run_id) else {
                return;
            };
            begin_execution(run);
            log_to_run(
                run,
                &self.events_tx,
                format!("Starting {agent} for project: {}", seed.project_name),
            )
            .await;
            run.operations.len()
        };

        for index in 0..operation_count {
            let operation = {
                let mut inner = shared.lock().await;
                let Some(run) = current_run(&mut inner, agent, run_id) else {
                    return;
                };
                set_operation_status(run, index, OperationStatus::Running, &self.events_tx).await;
                let operation = run.operations[index].clone();
                log_to_run(run, &self.events_tx, format!("Running: {}", operation.title)).await;
                operation
            };

            debug!(%agent, index, title = %operation.title, "executing operation");
            let outcome = self.executor.execute(agent, &operation).await;

            let mut inner = shared.lock().await;
            let Some(run) = current_run(&mut inner, agent, run_id) else {
                return;
            };
            match outcome {
                OperationOutcome::Completed => {
                    set_operation_status(run, index, OperationStatus::Completed, &self.events_tx)
                        .await;
                    log_to_run(run, &self.events_tx, format!("Completed: {}", operation.title))
                        .await;
                }
                OperationOutcome::Failed(reason) => {
                    set_operation_status(run, index, OperationStatus::Failed, &self.events_tx)
                        .await;
                    log_to_run(
                        run,
                        &self.events_tx,
                        format!("Failed: {}: {reason}", operation.title),
                    )
                    .await;
                    finish_run(run);
                    warn!(%agent, title = %operation.title, %reason, "operation failed");
                    self.fail_agent(&mut inner, agent).await;
                    return;
                }
            }
        }

        let (advance, session) = {
            let mut inner = shared.lock().await;
            match self.complete_agent(&mut inner, agent, run_id, seed).await {
                Some(advance) => (advance, inner.sequencer.session()),
                None => return,
            }
        };

        match advance {
            Advance::Next(next) => {
                self.scheduler
                    .sleep(Duration::from_millis(self.timing.advance_delay_ms))
                    .await;

                let inner = shared.lock().await;
                // A reset, re-selection or early start during the delay
                // invalidates the hand-off.
                if inner.sequencer.session() != session
                    || !inner.sequencer.is_active(next)
                    || inner.sequencer.status(next) != Some(AgentStatus::Pending)
                {
                    debug!(%next, "successor no longer awaiting input; skipping open");
                    return;
                }
                let previous_payload = inner.sequencer.previous_payload_for(next).cloned();
                let _ = self
                    .events_tx
                    .send(Event::OpenAgent {
                        agent: next,
                        previous_payload,
                    })
                    .await;
            }
            Advance::Finished => {
                let inner = shared.lock().await;
                let final_payload = inner.sequencer.final_payload().cloned();
                let _ = self
                    .events_tx
                    .send(Event::WorkflowCompleted { final_payload })
                    .await;
            }
            Advance::Stay => {}
        }
    }

    /// Store the payload and mark the agent completed, in one critical
    /// section so the successor never observes one without the other.
    async fn complete_agent(
        &self,
        inner: &mut WorkflowInner,
        agent: AgentName,
        run_id: Uuid,
        seed: RunSeed,
    ) -> Option<Advance> {
        let payload = AgentPayload {
            generated_document: generated_document(agent, &seed.project_name),
            project_name: seed.project_name,
            original_document: seed.original_document,
        };

        let run = current_run(inner, agent, run_id)?;
        finish_run(run);
        log_to_run(run, &self.events_tx, format!("{agent} completed")).await;

        if let Err(e) = inner
            .sequencer
            .on_agent_data_update(agent, Some(payload.clone()))
        {
            warn!(%agent, error = %e, "could not store payload");
            return None;
        }
        let advance = match inner
            .sequencer
            .on_agent_status_change(agent, AgentStatus::Completed)
        {
            Ok(advance) => advance,
            Err(e) => {
                warn!(%agent, error = %e, "could not complete agent");
                return None;
            }
        };
        clear_task(inner, agent);

        let _ = self
            .events_tx
            .send(Event::AgentPayloadUpdate {
                agent,
                payload: Some(payload),
            })
            .await;
        let _ = self
            .events_tx
            .send(Event::AgentStatusUpdate {
                agent,
                status: AgentStatus::Completed,
            })
            .await;
        let _ = self
            .events_tx
            .send(Event::ActiveAgentChanged {
                agent: inner.sequencer.active_agent(),
            })
            .await;

        debug!(%agent, ?advance, "agent completed");
        Some(advance)
    }

    async fn fail_agent(&self, inner: &mut WorkflowInner, agent: AgentName) {
        if let Err(e) = inner
            .sequencer
            .on_agent_status_change(agent, AgentStatus::Failed)
        {
            warn!(%agent, error = %e, "could not mark agent failed");
        }
        clear_task(inner, agent);

        let _ = self
            .events_tx
            .send(Event::AgentStatusUpdate {
                agent,
                status: AgentStatus::Failed,
            })
            .await;
    }
}

/// The run `run_id` of `agent`, if it is still live and unfinished.
fn current_run(
    inner: &mut WorkflowInner,
    agent: AgentName,
    run_id: Uuid,
) -> Option<&mut sf_protocol::AgentRun> {
    inner
        .runs
        .get_mut(&agent)
        .filter(|run| run.id == run_id && run.phase != RunPhase::Finished)
}

fn clear_task(inner: &mut WorkflowInner, agent: AgentName) {
    if inner.task.as_ref().is_some_and(|task| task.agent == agent) {
        inner.task = None;
    }
}
