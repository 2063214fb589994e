//! Event handling utilities for the TUI.
//!
//! This module provides functions for handling different types of events:
//! - Core events (from sf-core)
//! - Keyboard events (user input)
//! - Command parsing and submission

use crate::view::{OpenSurface, WorkflowView};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use sf_protocol::{
    AgentName, AgentRun, AgentStatus, Event, Op, OperationStatus, RunInput, RunPhase,
};
use tokio::sync::mpsc::Sender;

/// Handle an event received from the core.
pub fn handle_core_event(view: &mut WorkflowView, event: Event) {
    match event {
        Event::WorkflowInitialized { order } => {
            let names: Vec<&str> = order.iter().map(|a| a.short_name()).collect();
            view.notice = Some(format!("Workflow: {}", names.join(" -> ")));
            view.initialize(order);
        }
        Event::AgentStatusUpdate { agent, status } => {
            view.set_status(agent, status);
            if status == AgentStatus::Failed {
                if let Some(run) = view.runs.get_mut(&agent) {
                    run.phase = RunPhase::Finished;
                    run.finished_at = Some(chrono::Utc::now());
                }
                view.notice = Some(format!("{agent} failed; /start to retry"));
            }
        }
        Event::ActiveAgentChanged { agent } => {
            view.set_active(agent);
        }
        Event::OpenAgent {
            agent,
            previous_payload,
        } => {
            view.notice = Some(format!("{agent} is ready; /start to continue"));
            view.open = Some(OpenSurface {
                agent,
                previous_payload,
            });
        }
        Event::OperationsLoaded {
            run_id,
            agent,
            operations,
        } => {
            view.runs.insert(
                agent,
                AgentRun {
                    id: run_id,
                    agent,
                    phase: RunPhase::Armed,
                    operations,
                    started_at: chrono::Utc::now(),
                    finished_at: None,
                    logs: Vec::new(),
                },
            );
        }
        Event::OperationStatusUpdate {
            run_id,
            agent,
            index,
            status,
        } => {
            if let Some(run) = view.runs.get_mut(&agent).filter(|run| run.id == run_id) {
                if let Some(operation) = run.operations.get_mut(index) {
                    operation.status = status;
                }
                if status == OperationStatus::Running {
                    run.phase = RunPhase::Executing;
                }
            }
        }
        Event::AgentLogChunk { agent, content } => {
            if let Some(run) = view.runs.get_mut(&agent) {
                run.logs.push(content);
            }
        }
        Event::AgentPayloadUpdate { agent, payload } => match payload {
            Some(payload) => {
                if let Some(run) = view.runs.get_mut(&agent) {
                    run.phase = RunPhase::Finished;
                    run.finished_at = Some(chrono::Utc::now());
                }
                view.payloads.insert(agent, payload);
            }
            None => {
                view.payloads.remove(&agent);
            }
        },
        Event::AgentTerminated { agent } => {
            view.runs.remove(&agent);
            view.notice = Some(format!("{agent} terminated"));
        }
        Event::WorkflowCompleted { final_payload } => {
            view.final_payload = final_payload;
            view.open = None;
            view.notice = Some("Workflow completed".to_string());
        }
        Event::WorkflowState { state } => {
            view.apply_state(state);
        }
        Event::WorkflowReset => {
            view.clear();
            view.notice = Some("Workflow reset; /select to begin".to_string());
        }
        Event::Error { message } => {
            view.notice = Some(format!("Error: {message}"));
        }
    }
}

/// Handle a keyboard event from the user.
///
/// Returns `true` if the application should exit, `false` otherwise.
pub fn handle_keyboard_event(
    key_event: KeyEvent,
    command_input: &mut String,
    selected_index: &mut usize,
    view: &mut WorkflowView,
    default_agents: &[AgentName],
    op_tx: &Sender<Op>,
) -> bool {
    if key_event.kind != KeyEventKind::Press {
        return false;
    }

    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        KeyCode::Char('q') if command_input.is_empty() => {
            return true;
        }
        KeyCode::Esc => {
            command_input.clear();
        }
        KeyCode::Up => {
            if *selected_index > 0 {
                *selected_index -= 1;
            }
        }
        KeyCode::Down => {
            if *selected_index < view.agents.len().saturating_sub(1) {
                *selected_index += 1;
            }
        }
        KeyCode::Char(c) => {
            command_input.push(c);
        }
        KeyCode::Backspace => {
            command_input.pop();
        }
        KeyCode::Enter => {
            submit_command(command_input, *selected_index, view, default_agents, op_tx);
        }
        _ => {}
    }

    false
}

/// Submit the current command input.
fn submit_command(
    command_input: &mut String,
    selected_index: usize,
    view: &mut WorkflowView,
    default_agents: &[AgentName],
    op_tx: &Sender<Op>,
) {
    let line = std::mem::take(command_input);
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "/select" => {
            let agents: Vec<String> = if rest.is_empty() {
                default_agents
                    .iter()
                    .map(|a| a.display_name().to_string())
                    .collect()
            } else if rest.contains(',') {
                rest.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            } else {
                rest.split_whitespace().map(str::to_string).collect()
            };
            send(op_tx, view, Op::SelectAgents { agents });
        }
        "/project" => {
            view.draft.project_name = rest.to_string();
            view.notice = Some(format!("Project: {rest}"));
        }
        "/doc" => match std::fs::read_to_string(rest) {
            Ok(document) => {
                view.notice = Some(format!("Loaded {rest} ({} bytes)", document.len()));
                view.draft.document = Some(document);
                view.draft.document_source = Some(rest.to_string());
            }
            Err(e) => {
                view.notice = Some(format!("Cannot read {rest}: {e}"));
            }
        },
        "/start" => {
            let fallback = view.active;
            let Some(agent) = target_agent(rest, view, selected_index, fallback) else {
                return;
            };
            if let Some(input) = start_input(view, agent) {
                send(op_tx, view, Op::StartAgent { agent, input });
            }
        }
        "/terminate" => {
            let fallback = view.running_agent();
            let Some(agent) = target_agent(rest, view, selected_index, fallback) else {
                return;
            };
            send(op_tx, view, Op::TerminateAgent { agent });
        }
        "/close" => {
            let fallback = view.open.as_ref().map(|o| o.agent);
            let Some(agent) = target_agent(rest, view, selected_index, fallback) else {
                return;
            };
            if view.is_in_flight(agent) {
                view.notice = Some(format!("{agent} is still running; /terminate it first"));
                return;
            }
            view.runs.remove(&agent);
            if view.open.as_ref().is_some_and(|o| o.agent == agent) {
                view.open = None;
            }
            send(op_tx, view, Op::CloseAgent { agent });
        }
        "/reset" => send(op_tx, view, Op::Reset),
        "/refresh" => send(op_tx, view, Op::GetWorkflowState),
        other => {
            view.notice = Some(format!("Unknown command: {other}"));
        }
    }
}

/// Resolve the agent a command applies to: the named one, else `fallback`,
/// else the agent selected in the dashboard.
fn target_agent(
    arg: &str,
    view: &mut WorkflowView,
    selected_index: usize,
    fallback: Option<AgentName>,
) -> Option<AgentName> {
    if !arg.is_empty() {
        return match arg.parse::<AgentName>() {
            Ok(agent) => Some(agent),
            Err(e) => {
                view.notice = Some(e.to_string());
                None
            }
        };
    }
    let agent = fallback.or_else(|| view.agent_at(selected_index));
    if agent.is_none() {
        view.notice = Some("No agent selected; /select agents first".to_string());
    }
    agent
}

/// Build the start input for `agent`, or explain on the status line why the
/// start button would be disabled.
fn start_input(view: &mut WorkflowView, agent: AgentName) -> Option<RunInput> {
    if !view.is_first(agent) {
        let ready = view
            .agents
            .iter()
            .position(|a| a.name == agent)
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| view.agents.get(i))
            .is_some_and(|previous| {
                previous.status == AgentStatus::Completed
                    && view.payloads.contains_key(&previous.name)
            });
        if !ready {
            view.notice = Some(format!("{agent} is waiting for the previous agent"));
            return None;
        }
        return Some(RunInput::carry_over());
    }

    if view.draft.project_name.trim().is_empty() {
        view.notice = Some("Set a project name with /project first".to_string());
        return None;
    }
    let Some(document) = view.draft.document.clone() else {
        view.notice = Some("Load a document with /doc first".to_string());
        return None;
    };
    Some(RunInput {
        project_name: view.draft.project_name.clone(),
        document: Some(document),
    })
}

fn send(op_tx: &Sender<Op>, view: &mut WorkflowView, op: Op) {
    if op_tx.try_send(op).is_err() {
        view.notice = Some("Core is not responding".to_string());
    }
}
