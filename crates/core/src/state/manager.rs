//! Workflow manager coordinating the sequencer and agent runs.
//!
//! The WorkflowManager is the central orchestrator for a workflow. It owns
//! the sequencer, the operation list of every started agent and the handle
//! of the one run in flight, and exposes the operations the UI drives:
//! selecting agents, starting, terminating and closing agent runs.

use crate::agents::base::{OperationExecutor, Scheduler};
use crate::engine::{RunSeed, StepRunner};
use crate::error::{WorkflowError, WorkflowResult};
use crate::sequencer::PipelineSequencer;
use crate::state::run::{announce_run, create_run, rollback_run};
use sf_protocol::{
    AgentName, AgentRun, AgentStatus, Event, Op, RunInput, RunPhase, TimingConfig, WorkflowState,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// State shared between the manager and the background run task.
pub(crate) struct WorkflowInner {
    pub(crate) sequencer: PipelineSequencer,

    /// Loaded operation lists, one per started agent.
    pub(crate) runs: HashMap<AgentName, AgentRun>,

    /// The run currently armed or executing.
    pub(crate) task: Option<RunningTask>,
}

pub(crate) struct RunningTask {
    pub(crate) agent: AgentName,
    pub(crate) handle: JoinHandle<()>,
}

impl WorkflowInner {
    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.handle.abort();
        }
    }
}

/// Owns one workflow and serializes every mutation of it.
///
/// Cloning is cheap; clones share the same workflow.
#[derive(Clone)]
pub struct WorkflowManager {
    inner: Arc<Mutex<WorkflowInner>>,

    /// Executes runs in the background.
    runner: Arc<StepRunner>,

    /// Channel for sending events to the UI.
    events_tx: mpsc::Sender<Event>,
}

impl WorkflowManager {
    /// Create a manager with no agents selected.
    pub fn new(
        executor: Arc<dyn OperationExecutor>,
        scheduler: Arc<dyn Scheduler>,
        timing: TimingConfig,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        let runner = StepRunner::new(executor, scheduler, timing, events_tx.clone());

        Self {
            inner: Arc::new(Mutex::new(WorkflowInner {
                sequencer: PipelineSequencer::new(),
                runs: HashMap::new(),
                task: None,
            })),
            runner: Arc::new(runner),
            events_tx,
        }
    }

    /// Start a fresh workflow over the selected agents.
    ///
    /// Replaces any prior state, aborting a run still in flight. Fails with
    /// `InvalidAgent` without touching the current workflow if any name is
    /// not one of the six agents.
    pub async fn initialize<I, S>(&self, selection: I) -> WorkflowResult<Vec<AgentName>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = self.inner.lock().await;
        let order = inner.sequencer.initialize(selection)?;
        inner.abort_task();
        inner.runs.clear();

        info!(order = ?order, "workflow initialized");
        let _ = self
            .events_tx
            .send(Event::WorkflowInitialized {
                order: order.clone(),
            })
            .await;
        let _ = self
            .events_tx
            .send(Event::ActiveAgentChanged {
                agent: inner.sequencer.active_agent(),
            })
            .await;

        Ok(order)
    }

    /// Start executing `agent` in the background.
    ///
    /// The first agent of the execution order needs a non-empty project name
    /// and a document; every later agent needs its predecessor's payload and
    /// ignores `input`. A rejected start leaves all state untouched.
    pub async fn start(&self, agent: AgentName, input: RunInput) -> WorkflowResult<()> {
        let mut inner = self.inner.lock().await;

        let status = inner
            .sequencer
            .status(agent)
            .ok_or(WorkflowError::NotInWorkflow(agent))?;
        if let Some(running) = inner.sequencer.running_agent() {
            return Err(WorkflowError::AgentBusy { running });
        }
        match status {
            AgentStatus::Pending | AgentStatus::Failed => {}
            AgentStatus::Completed => {
                return Err(WorkflowError::precondition(agent, "agent already completed"));
            }
            AgentStatus::Running => {
                return Err(WorkflowError::AgentBusy { running: agent });
            }
        }

        let seed = seed_for(&inner.sequencer, agent, input)?;

        inner
            .sequencer
            .on_agent_status_change(agent, AgentStatus::Running)?;
        let run = create_run(agent);
        let run_id = run.id;
        announce_run(&run, &self.events_tx).await;
        inner.runs.insert(agent, run);

        let _ = self
            .events_tx
            .send(Event::AgentStatusUpdate {
                agent,
                status: AgentStatus::Running,
            })
            .await;

        let runner = Arc::clone(&self.runner);
        let shared = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            runner.run(shared, agent, run_id, seed).await;
        });
        inner.task = Some(RunningTask { agent, handle });

        info!(%agent, %run_id, "agent started");
        Ok(())
    }

    /// Cancel the in-flight run of `agent` and roll it back completely.
    ///
    /// The running operation is demoted to pending, the operation list is
    /// discarded, the agent returns to `Pending` and its payload is cleared.
    /// Other agents are not touched.
    pub async fn terminate(&self, agent: AgentName) -> WorkflowResult<()> {
        let mut inner = self.inner.lock().await;

        if !inner.sequencer.contains(agent) {
            return Err(WorkflowError::NotInWorkflow(agent));
        }
        let in_flight = inner
            .runs
            .get(&agent)
            .is_some_and(|run| matches!(run.phase, RunPhase::Armed | RunPhase::Executing));
        if !in_flight {
            return Err(WorkflowError::NotExecuting(agent));
        }

        inner.abort_task();
        if let Some(mut run) = inner.runs.remove(&agent) {
            rollback_run(&mut run, &self.events_tx).await;
        }
        inner.sequencer.terminate(agent)?;

        info!(%agent, "agent terminated");
        let _ = self
            .events_tx
            .send(Event::AgentStatusUpdate {
                agent,
                status: AgentStatus::Pending,
            })
            .await;
        let _ = self
            .events_tx
            .send(Event::AgentPayloadUpdate {
                agent,
                payload: None,
            })
            .await;
        let _ = self
            .events_tx
            .send(Event::AgentTerminated { agent })
            .await;

        Ok(())
    }

    /// Discard the operation list of a finished run.
    ///
    /// The agent's status and payload are unchanged. Closing an agent that
    /// was never started is a no-op.
    pub async fn close(&self, agent: AgentName) -> WorkflowResult<()> {
        let mut inner = self.inner.lock().await;

        if !inner.sequencer.contains(agent) {
            return Err(WorkflowError::NotInWorkflow(agent));
        }
        if inner
            .runs
            .get(&agent)
            .is_some_and(|run| run.phase != RunPhase::Finished)
        {
            return Err(WorkflowError::AgentBusy { running: agent });
        }

        if inner.runs.remove(&agent).is_some() {
            debug!(%agent, "run closed");
        }
        Ok(())
    }

    /// `true` when `agent` has a loaded operation list and every operation
    /// in it has completed.
    pub async fn is_complete(&self, agent: AgentName) -> bool {
        let inner = self.inner.lock().await;
        inner.runs.get(&agent).is_some_and(AgentRun::is_complete)
    }

    /// Snapshot of the whole workflow.
    pub async fn state(&self) -> WorkflowState {
        let inner = self.inner.lock().await;

        let mut runs: Vec<AgentRun> = inner.runs.values().cloned().collect();
        runs.sort_by_key(|run| run.agent);

        WorkflowState {
            order: inner.sequencer.order().to_vec(),
            agents: inner.sequencer.snapshot(),
            active: inner.sequencer.active_agent(),
            runs,
            final_payload: inner.sequencer.final_payload().cloned(),
        }
    }

    /// Drop the workflow entirely, aborting any run in flight.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.abort_task();
        inner.runs.clear();
        inner.sequencer.reset();

        info!("workflow reset");
        let _ = self.events_tx.send(Event::WorkflowReset).await;
    }

    /// Apply one UI operation, reporting failures as `Event::Error`.
    ///
    /// Returns `false` once `Op::Shutdown` has been handled.
    pub async fn handle_op(&self, op: Op) -> bool {
        let result = match op {
            Op::SelectAgents { agents } => self.initialize(agents).await.map(|_| ()),
            Op::StartAgent { agent, input } => self.start(agent, input).await,
            Op::TerminateAgent { agent } => self.terminate(agent).await,
            Op::CloseAgent { agent } => self.close(agent).await,
            Op::GetWorkflowState => {
                let state = self.state().await;
                let _ = self.events_tx.send(Event::WorkflowState { state }).await;
                Ok(())
            }
            Op::Reset => {
                self.reset().await;
                Ok(())
            }
            Op::Shutdown => {
                self.inner.lock().await.abort_task();
                return false;
            }
        };

        if let Err(e) = result {
            debug!(error = %e, "operation rejected");
            let _ = self
                .events_tx
                .send(Event::Error {
                    message: e.to_string(),
                })
                .await;
        }
        true
    }
}

/// Resolve what `agent` will work from, or explain why it cannot start.
fn seed_for(
    sequencer: &PipelineSequencer,
    agent: AgentName,
    input: RunInput,
) -> WorkflowResult<RunSeed> {
    if sequencer.is_first(agent) {
        if input.project_name.trim().is_empty() {
            return Err(WorkflowError::precondition(agent, "project name is empty"));
        }
        let Some(document) = input.document else {
            return Err(WorkflowError::precondition(agent, "no document supplied"));
        };
        return Ok(RunSeed {
            project_name: input.project_name,
            original_document: document,
        });
    }

    let previous = sequencer.previous_payload_for(agent).ok_or_else(|| {
        WorkflowError::precondition(agent, "previous agent has not produced a payload")
    })?;
    Ok(RunSeed {
        project_name: previous.project_name.clone(),
        original_document: previous.generated_document.clone(),
    })
}

/// Main loop applying ops from the UI until `Op::Shutdown` or the channel
/// closes.
pub async fn run_core(manager: WorkflowManager, mut op_rx: mpsc::Receiver<Op>) {
    while let Some(op) = op_rx.recv().await {
        if !manager.handle_op(op).await {
            break;
        }
    }
    debug!("core loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::adapters::{ScriptedExecutor, SimulatedExecutor};
    use crate::agents::base::{DelayPolicy, InstantScheduler, TokioScheduler};
    use sf_protocol::OperationStatus;
    use std::time::Duration;

    fn instant_manager(capacity: usize) -> (WorkflowManager, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        let manager = WorkflowManager::new(
            Arc::new(ScriptedExecutor::success()),
            Arc::new(InstantScheduler),
            TimingConfig::immediate(),
            tx,
        );
        (manager, rx)
    }

    /// Manager on the tokio clock with fixed 100ms operations.
    fn timed_manager() -> (WorkflowManager, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(1024);
        let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler);
        let executor = SimulatedExecutor::new(
            DelayPolicy::fixed(Duration::from_millis(100)),
            scheduler.clone(),
        );
        let timing = TimingConfig {
            min_operation_ms: 100,
            max_operation_ms: 100,
            ..TimingConfig::default()
        };
        let manager = WorkflowManager::new(Arc::new(executor), scheduler, timing, tx);
        (manager, rx)
    }

    async fn wait_for<F>(rx: &mut mpsc::Receiver<Event>, mut predicate: F) -> Event
    where
        F: FnMut(&Event) -> bool,
    {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if predicate(&event) {
                return event;
            }
        }
    }

    #[tokio::test]
    async fn test_initialize_emits_order_and_active_agent() {
        let (manager, mut rx) = instant_manager(16);

        let order = manager
            .initialize(["Design Agent", "Requirement Agent"])
            .await
            .unwrap();
        assert_eq!(order, vec![AgentName::Requirement, AgentName::Design]);

        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::WorkflowInitialized { order } if order.len() == 2
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::ActiveAgentChanged {
                agent: Some(AgentName::Requirement)
            }
        ));
    }

    #[tokio::test]
    async fn test_initialize_with_unknown_agent_keeps_state() {
        let (manager, _rx) = instant_manager(16);
        manager.initialize(["Dev Agent"]).await.unwrap();

        let result = manager.initialize(["Dev Agent", "Security Agent"]).await;
        assert_eq!(
            result,
            Err(WorkflowError::InvalidAgent("Security Agent".to_string()))
        );

        let state = manager.state().await;
        assert_eq!(state.order, vec![AgentName::Dev]);
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.active, Some(AgentName::Dev));
    }

    #[tokio::test]
    async fn test_start_with_empty_project_name_is_rejected() {
        let (manager, _rx) = instant_manager(16);
        manager
            .initialize(["Requirement Agent", "Design Agent"])
            .await
            .unwrap();

        let result = manager
            .start(AgentName::Requirement, RunInput::new("   ", "D"))
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::PreconditionNotMet {
                agent: AgentName::Requirement,
                ..
            })
        ));

        let state = manager.state().await;
        assert!(state.runs.is_empty());
        assert_eq!(state.agents[0].status, AgentStatus::Pending);
    }

    #[tokio::test]
    async fn test_start_without_document_is_rejected() {
        let (manager, _rx) = instant_manager(16);
        manager.initialize(["Requirement Agent"]).await.unwrap();

        let input = RunInput {
            project_name: "Foo".to_string(),
            document: None,
        };
        let result = manager.start(AgentName::Requirement, input).await;
        assert!(matches!(
            result,
            Err(WorkflowError::PreconditionNotMet { .. })
        ));
    }

    #[tokio::test]
    async fn test_start_successor_before_predecessor_completes_is_rejected() {
        let (manager, _rx) = instant_manager(16);
        manager
            .initialize(["Requirement Agent", "Design Agent"])
            .await
            .unwrap();

        let result = manager.start(AgentName::Design, RunInput::carry_over()).await;
        assert!(matches!(
            result,
            Err(WorkflowError::PreconditionNotMet {
                agent: AgentName::Design,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_start_agent_outside_workflow() {
        let (manager, _rx) = instant_manager(16);
        manager.initialize(["Requirement Agent"]).await.unwrap();

        let result = manager
            .start(AgentName::Deploy, RunInput::new("Foo", "D"))
            .await;
        assert_eq!(result, Err(WorkflowError::NotInWorkflow(AgentName::Deploy)));
    }

    #[tokio::test]
    async fn test_first_agent_need_not_be_requirement() {
        let (manager, mut rx) = instant_manager(256);
        manager.initialize(["Dev Agent"]).await.unwrap();

        manager
            .start(AgentName::Dev, RunInput::new("Foo", "D"))
            .await
            .unwrap();
        wait_for(&mut rx, |e| matches!(e, Event::WorkflowCompleted { .. })).await;

        assert!(manager.is_complete(AgentName::Dev).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_while_running_is_busy() {
        let (manager, mut rx) = timed_manager();
        manager
            .initialize(["Requirement Agent", "Design Agent"])
            .await
            .unwrap();
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();

        let again = manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await;
        assert_eq!(
            again,
            Err(WorkflowError::AgentBusy {
                running: AgentName::Requirement
            })
        );

        wait_for(&mut rx, |e| matches!(e, Event::OpenAgent { .. })).await;
        let state = manager.state().await;
        assert_eq!(state.agents[0].status, AgentStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminate_rolls_back_running_agent() {
        let (manager, mut rx) = timed_manager();
        manager
            .initialize(["Requirement Agent", "Design Agent"])
            .await
            .unwrap();
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();

        wait_for(&mut rx, |e| {
            matches!(
                e,
                Event::OperationStatusUpdate {
                    index: 1,
                    status: OperationStatus::Running,
                    ..
                }
            )
        })
        .await;

        manager.terminate(AgentName::Requirement).await.unwrap();

        let state = manager.state().await;
        assert!(state.runs.is_empty());
        assert_eq!(state.agents[0].status, AgentStatus::Pending);
        assert_eq!(state.agents[1].status, AgentStatus::Pending);
        assert_eq!(state.active, Some(AgentName::Requirement));
        assert!(!manager.is_complete(AgentName::Requirement).await);

        // The aborted task never reports again
        tokio::time::sleep(Duration::from_secs(10)).await;
        let state = manager.state().await;
        assert_eq!(state.agents[0].status, AgentStatus::Pending);
        assert!(state.runs.is_empty());
    }

    #[tokio::test]
    async fn test_terminate_idle_agent_is_rejected() {
        let (manager, _rx) = instant_manager(16);
        manager.initialize(["Requirement Agent"]).await.unwrap();

        assert_eq!(
            manager.terminate(AgentName::Requirement).await,
            Err(WorkflowError::NotExecuting(AgentName::Requirement))
        );
    }

    #[tokio::test]
    async fn test_failed_agent_can_be_restarted() {
        let (tx, mut rx) = mpsc::channel(256);
        let executor = ScriptedExecutor::failing_at(
            AgentName::Requirement,
            "Generate User Stories",
            "timeout",
        );
        let manager = WorkflowManager::new(
            Arc::new(executor),
            Arc::new(InstantScheduler),
            TimingConfig::immediate(),
            tx,
        );
        manager.initialize(["Requirement Agent"]).await.unwrap();
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();

        wait_for(&mut rx, |e| {
            matches!(
                e,
                Event::AgentStatusUpdate {
                    status: AgentStatus::Failed,
                    ..
                }
            )
        })
        .await;

        // Restarting reloads a fresh operation list
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();
        let state = manager.state().await;
        assert_eq!(state.agents[0].status, AgentStatus::Running);
        assert!(state.runs[0]
            .operations
            .iter()
            .all(|op| op.status == OperationStatus::Pending));
    }

    #[tokio::test]
    async fn test_close_discards_finished_run_only() {
        let (manager, mut rx) = instant_manager(256);
        manager.initialize(["Requirement Agent"]).await.unwrap();
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();
        wait_for(&mut rx, |e| matches!(e, Event::WorkflowCompleted { .. })).await;

        manager.close(AgentName::Requirement).await.unwrap();

        let state = manager.state().await;
        assert!(state.runs.is_empty());
        assert_eq!(state.agents[0].status, AgentStatus::Completed);
        assert!(state.final_payload.is_some());

        // Closing again is harmless
        assert!(manager.close(AgentName::Requirement).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_running_agent_is_rejected() {
        let (manager, _rx) = timed_manager();
        manager.initialize(["Requirement Agent"]).await.unwrap();
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();

        assert_eq!(
            manager.close(AgentName::Requirement).await,
            Err(WorkflowError::AgentBusy {
                running: AgentName::Requirement
            })
        );
    }

    #[tokio::test]
    async fn test_project_name_is_kept_as_typed() {
        let (manager, mut rx) = instant_manager(256);
        manager.initialize(["Requirement Agent"]).await.unwrap();

        manager
            .start(AgentName::Requirement, RunInput::new("  Foo ", "D"))
            .await
            .unwrap();

        let event = wait_for(&mut rx, |e| {
            matches!(e, Event::AgentPayloadUpdate { payload: Some(_), .. })
        })
        .await;
        let Event::AgentPayloadUpdate {
            payload: Some(payload),
            ..
        } = event
        else {
            unreachable!()
        };
        assert_eq!(payload.project_name, "  Foo ");
        assert_eq!(
            payload.generated_document,
            "Generated output from Requirement Agent for project:   Foo "
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_successor_started_during_advance_delay_is_not_reopened() {
        let (tx, mut rx) = mpsc::channel(1024);
        let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler);
        let executor = SimulatedExecutor::new(
            DelayPolicy::fixed(Duration::from_millis(400)),
            scheduler.clone(),
        );
        let timing = TimingConfig {
            min_operation_ms: 400,
            max_operation_ms: 400,
            ..TimingConfig::default()
        };
        let manager = WorkflowManager::new(Arc::new(executor), scheduler, timing, tx);
        manager
            .initialize(["Requirement Agent", "Design Agent", "Dev Agent"])
            .await
            .unwrap();
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();

        wait_for(&mut rx, |e| {
            matches!(
                e,
                Event::ActiveAgentChanged {
                    agent: Some(AgentName::Design)
                }
            )
        })
        .await;
        manager
            .start(AgentName::Design, RunInput::carry_over())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut opened = Vec::new();
        let mut errors = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                Event::OpenAgent { agent, .. } => opened.push(agent),
                Event::Error { message } => errors.push(message),
                _ => {}
            }
        }
        assert_eq!(opened, vec![AgentName::Dev]);
        assert!(errors.is_empty());
        assert!(manager.is_complete(AgentName::Design).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_suppresses_pending_successor_open() {
        let (manager, mut rx) = timed_manager();
        manager
            .initialize(["Requirement Agent", "Design Agent"])
            .await
            .unwrap();
        manager
            .start(AgentName::Requirement, RunInput::new("Foo", "D"))
            .await
            .unwrap();

        wait_for(&mut rx, |e| {
            matches!(
                e,
                Event::ActiveAgentChanged {
                    agent: Some(AgentName::Design)
                }
            )
        })
        .await;
        manager.reset().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        let mut saw_open = false;
        while let Ok(event) = rx.try_recv() {
            saw_open |= matches!(event, Event::OpenAgent { .. });
        }
        assert!(!saw_open);
        assert!(manager.state().await.agents.is_empty());
    }

    #[tokio::test]
    async fn test_handle_op_reports_errors_as_events() {
        let (manager, mut rx) = instant_manager(16);

        assert!(
            manager
                .handle_op(Op::SelectAgents {
                    agents: vec!["Nope".to_string()],
                })
                .await
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::Error { message } if message.contains("Nope")
        ));
    }

    #[tokio::test]
    async fn test_run_core_stops_on_shutdown() {
        let (manager, mut rx) = instant_manager(16);
        let (op_tx, op_rx) = mpsc::channel(16);

        let core = tokio::spawn(run_core(manager, op_rx));

        op_tx.send(Op::GetWorkflowState).await.unwrap();
        op_tx.send(Op::Shutdown).await.unwrap();
        core.await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::WorkflowState { state } if state.agents.is_empty()
        ));
    }
}
