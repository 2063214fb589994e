//! Pipeline sequencer.
//!
//! The `PipelineSequencer` owns the execution order, each agent's status, the
//! active marker and the payload map. It is plain synchronous state; the
//! workflow manager wraps it in a mutex and drives it from the step runner.

use crate::error::{WorkflowError, WorkflowResult};
use sf_protocol::{AgentName, AgentPayload, AgentSnapshot, AgentStatus};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// What the sequencer decided after an agent changed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing to advance.
    Stay,
    /// The given successor is now active; its control surface should open.
    Next(AgentName),
    /// The last agent completed. No agent is active anymore.
    Finished,
}

/// Ordered agent list, per-agent status and hand-off payloads for one
/// workflow session.
#[derive(Debug, Default)]
pub struct PipelineSequencer {
    /// Identifies the current session. Changes on every initialize/reset so
    /// that delayed signals from an earlier session can be discarded.
    session: Option<Uuid>,
    order: Vec<AgentName>,
    statuses: HashMap<AgentName, AgentStatus>,
    active: Option<AgentName>,
    payloads: HashMap<AgentName, AgentPayload>,
}

impl PipelineSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session from a raw selection of agent names.
    ///
    /// Names are sorted into canonical phase order and deduplicated. Every
    /// agent starts `Pending` and the first one becomes active. All prior
    /// state is replaced.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAgent` for the first name outside the closed set. The
    /// sequencer is left untouched in that case.
    pub fn initialize<I, S>(&mut self, selection: I) -> WorkflowResult<Vec<AgentName>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let agents = selection
            .into_iter()
            .map(|name| {
                name.as_ref()
                    .parse::<AgentName>()
                    .map_err(|e| WorkflowError::InvalidAgent(e.0))
            })
            .collect::<WorkflowResult<Vec<_>>>()?;

        Ok(self.initialize_agents(agents))
    }

    /// Start a new session from already-validated agent names.
    pub fn initialize_agents(
        &mut self,
        selection: impl IntoIterator<Item = AgentName>,
    ) -> Vec<AgentName> {
        let mut order: Vec<AgentName> = selection.into_iter().collect();
        order.sort_by_key(|a| a.phase_index());
        order.dedup();

        self.session = Some(Uuid::new_v4());
        self.statuses = order.iter().map(|a| (*a, AgentStatus::Pending)).collect();
        self.active = order.first().copied();
        self.payloads.clear();
        self.order = order;

        debug!(order = ?self.order, "workflow initialized");
        self.order.clone()
    }

    /// Drop the session entirely.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn session(&self) -> Option<Uuid> {
        self.session
    }

    /// Agents in execution order.
    pub fn order(&self) -> &[AgentName] {
        &self.order
    }

    pub fn contains(&self, agent: AgentName) -> bool {
        self.statuses.contains_key(&agent)
    }

    pub fn status(&self, agent: AgentName) -> Option<AgentStatus> {
        self.statuses.get(&agent).copied()
    }

    /// The agent awaiting user action, or `None` once all have completed.
    pub fn active_agent(&self) -> Option<AgentName> {
        self.active
    }

    pub fn is_active(&self, agent: AgentName) -> bool {
        self.active == Some(agent)
    }

    /// True iff `agent` is first in the execution order.
    pub fn is_first(&self, agent: AgentName) -> bool {
        self.order.first() == Some(&agent)
    }

    pub fn predecessor(&self, agent: AgentName) -> Option<AgentName> {
        let index = self.position(agent)?;
        index.checked_sub(1).map(|i| self.order[i])
    }

    pub fn successor(&self, agent: AgentName) -> Option<AgentName> {
        let index = self.position(agent)?;
        self.order.get(index + 1).copied()
    }

    /// The agent currently `Running`, if any.
    pub fn running_agent(&self) -> Option<AgentName> {
        self.order
            .iter()
            .copied()
            .find(|a| self.status(*a) == Some(AgentStatus::Running))
    }

    /// Record a status change reported by the step runner.
    ///
    /// Allowed transitions:
    /// - Pending/Failed -> Running (only the active agent, and only while no
    ///   other agent runs)
    /// - Running -> Completed | Failed | Pending
    ///
    /// Re-reporting the current status is a no-op. When an agent completes,
    /// its successor becomes active; completing the last agent clears the
    /// active marker.
    pub fn on_agent_status_change(
        &mut self,
        agent: AgentName,
        new_status: AgentStatus,
    ) -> WorkflowResult<Advance> {
        let current = self
            .status(agent)
            .ok_or(WorkflowError::NotInWorkflow(agent))?;

        if current == new_status {
            return Ok(Advance::Stay);
        }

        use AgentStatus::{Completed, Failed, Pending, Running};
        match (current, new_status) {
            (Pending | Failed, Running) => {
                if let Some(running) = self.running_agent() {
                    return Err(WorkflowError::AgentBusy { running });
                }
                if !self.is_active(agent) {
                    return Err(WorkflowError::InvalidTransition {
                        agent,
                        from: current,
                        to: new_status,
                    });
                }
            }
            (Running, Completed | Failed | Pending) => {}
            (from, to) => {
                return Err(WorkflowError::InvalidTransition { agent, from, to });
            }
        }

        self.statuses.insert(agent, new_status);
        debug!(%agent, status = ?new_status, "agent status changed");

        if new_status != Completed {
            return Ok(Advance::Stay);
        }

        match self.successor(agent) {
            Some(next) => {
                self.active = Some(next);
                Ok(Advance::Next(next))
            }
            None => {
                self.active = None;
                Ok(Advance::Finished)
            }
        }
    }

    /// Store (`Some`) or clear (`None`) the payload of one agent.
    ///
    /// Clearing never touches any other agent's payload and is idempotent.
    pub fn on_agent_data_update(
        &mut self,
        agent: AgentName,
        payload: Option<AgentPayload>,
    ) -> WorkflowResult<()> {
        if !self.contains(agent) {
            return Err(WorkflowError::NotInWorkflow(agent));
        }

        match payload {
            Some(payload) => {
                self.payloads.insert(agent, payload);
            }
            None => {
                self.payloads.remove(&agent);
            }
        }
        Ok(())
    }

    /// The payload stored for `agent` itself.
    pub fn payload(&self, agent: AgentName) -> Option<&AgentPayload> {
        self.payloads.get(&agent)
    }

    /// The payload of the agent right before `agent` in execution order.
    ///
    /// `None` if `agent` is first, or the predecessor has not completed and
    /// stored its payload yet.
    pub fn previous_payload_for(&self, agent: AgentName) -> Option<&AgentPayload> {
        let previous = self.predecessor(agent)?;
        if self.status(previous) != Some(AgentStatus::Completed) {
            return None;
        }
        self.payloads.get(&previous)
    }

    /// Roll a single agent back to `Pending` and clear its payload.
    ///
    /// Neighbours keep their statuses and payloads.
    pub fn terminate(&mut self, agent: AgentName) -> WorkflowResult<()> {
        self.on_agent_status_change(agent, AgentStatus::Pending)?;
        self.on_agent_data_update(agent, None)
    }

    /// Payload of the last agent once every agent has completed.
    pub fn final_payload(&self) -> Option<&AgentPayload> {
        if self.active.is_some() {
            return None;
        }
        let last = self.order.last()?;
        if self.status(*last) != Some(AgentStatus::Completed) {
            return None;
        }
        self.payloads.get(last)
    }

    /// Statuses in execution order, for the workflow visualization.
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.order
            .iter()
            .map(|agent| AgentSnapshot {
                name: *agent,
                status: self.status(*agent).unwrap_or_default(),
                is_active: self.is_active(*agent),
            })
            .collect()
    }

    fn position(&self, agent: AgentName) -> Option<usize> {
        self.order.iter().position(|a| *a == agent)
    }
}
