//! Agent run state machine implementation.
//!
//! This module provides functions for managing the lifecycle of an
//! `AgentRun`, including operation transitions and event emission.

use crate::agents::catalog::operations_for;
use sf_protocol::{AgentName, AgentRun, Event, OperationStatus, RunPhase};
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

/// Create a new run with the agent's operations loaded, all pending.
///
/// The returned run is in the Armed phase.
pub fn create_run(agent: AgentName) -> AgentRun {
    AgentRun {
        id: Uuid::new_v4(),
        agent,
        phase: RunPhase::Armed,
        operations: operations_for(agent),
        started_at: chrono::Utc::now(),
        finished_at: None,
        logs: Vec::new(),
    }
}

/// Announce the freshly armed run and its operation list.
pub async fn announce_run(run: &AgentRun, events_tx: &Sender<Event>) {
    let _ = events_tx
        .send(Event::OperationsLoaded {
            run_id: run.id,
            agent: run.agent,
            operations: run.operations.clone(),
        })
        .await;
}

/// Move an armed run into the Executing phase.
pub fn begin_execution(run: &mut AgentRun) {
    run.phase = RunPhase::Executing;
}

/// Set one operation's status and emit the update.
///
/// Out-of-range indices are ignored.
pub async fn set_operation_status(
    run: &mut AgentRun,
    index: usize,
    status: OperationStatus,
    events_tx: &Sender<Event>,
) {
    let Some(operation) = run.operations.get_mut(index) else {
        return;
    };
    operation.status = status;

    let _ = events_tx
        .send(Event::OperationStatusUpdate {
            run_id: run.id,
            agent: run.agent,
            index,
            status,
        })
        .await;
}

/// Mark the run as finished.
pub fn finish_run(run: &mut AgentRun) {
    run.phase = RunPhase::Finished;
    run.finished_at = Some(chrono::Utc::now());
}

/// Undo an in-progress run.
///
/// Any running operation is demoted back to pending and the run returns to
/// Idle. The caller discards the run afterwards.
pub async fn rollback_run(run: &mut AgentRun, events_tx: &Sender<Event>) {
    let running: Vec<usize> = run
        .operations
        .iter()
        .enumerate()
        .filter(|(_, op)| op.status == OperationStatus::Running)
        .map(|(i, _)| i)
        .collect();

    for index in running {
        set_operation_status(run, index, OperationStatus::Pending, events_tx).await;
    }

    run.phase = RunPhase::Idle;
    run.finished_at = None;
}

/// Append a log message to the run and emit it.
pub async fn log_to_run(run: &mut AgentRun, events_tx: &Sender<Event>, message: String) {
    run.logs.push(message.clone());
    let _ = events_tx
        .send(Event::AgentLogChunk {
            agent: run.agent,
            content: message,
        })
        .await;
}
