//! Event collectors and assertion helpers.

use sf_protocol::{AgentName, AgentStatus, Event, OperationStatus};
use std::time::Duration;
use tokio::sync::mpsc;

/// Receive events until `stop` matches one (inclusive) or `timeout` passes.
#[allow(dead_code)]
pub async fn collect_until<F>(
    rx: &mut mpsc::Receiver<Event>,
    timeout: Duration,
    mut stop: F,
) -> Vec<Event>
where
    F: FnMut(&Event) -> bool,
{
    let mut events = Vec::new();
    let _ = tokio::time::timeout(timeout, async {
        while let Some(event) = rx.recv().await {
            let done = stop(&event);
            events.push(event);
            if done {
                break;
            }
        }
    })
    .await;
    events
}

/// Drain whatever is already queued.
#[allow(dead_code)]
pub fn drain(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[allow(dead_code)]
pub fn is_workflow_completed(event: &Event) -> bool {
    matches!(event, Event::WorkflowCompleted { .. })
}

#[allow(dead_code)]
pub fn is_open(event: &Event, agent: AgentName) -> bool {
    matches!(event, Event::OpenAgent { agent: a, .. } if *a == agent)
}

#[allow(dead_code)]
pub fn is_operation_running(event: &Event, agent: AgentName, index: usize) -> bool {
    matches!(
        event,
        Event::OperationStatusUpdate {
            agent: a,
            index: i,
            status: OperationStatus::Running,
            ..
        } if *a == agent && *i == index
    )
}

/// Statuses reported for `agent`, in order.
#[allow(dead_code)]
pub fn status_updates(events: &[Event], agent: AgentName) -> Vec<AgentStatus> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::AgentStatusUpdate { agent: a, status } if *a == agent => Some(*status),
            _ => None,
        })
        .collect()
}

/// Assert that at no point more than one operation of a run was running.
#[allow(dead_code)]
pub fn assert_single_running_operation(events: &[Event]) {
    let mut running: Option<(AgentName, usize)> = None;
    for event in events {
        if let Event::OperationStatusUpdate {
            agent,
            index,
            status,
            ..
        } = event
        {
            match status {
                OperationStatus::Running => {
                    assert!(
                        running.is_none(),
                        "{agent} operation {index} started while {running:?} was running"
                    );
                    running = Some((*agent, *index));
                }
                _ => {
                    if running == Some((*agent, *index)) {
                        running = None;
                    }
                }
            }
        }
    }
}
