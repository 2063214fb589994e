//! Operation models for a single agent run.
//!
//! An agent run is a fixed, ordered list of operations executed one at a
//! time. The list for each agent comes from a lookup table in `sf-core`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Status of a single operation inside an agent run.
///
/// Progression is Pending -> Running -> Completed. A terminated run demotes
/// its running operation back to Pending. Failed is reserved for executors
/// that report a failed outcome.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

/// One sub-step of an agent's simulated work unit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Operation {
    /// Identifier, unique within one agent's operation list ("1", "2", ...).
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: OperationStatus,
}

impl Operation {
    /// Create a pending operation.
    pub fn pending(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status: OperationStatus::Pending,
        }
    }
}

/// Result reported by an executor for one operation.
///
/// The simulated executor only ever produces `Completed`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "outcome", content = "reason", rename_all = "camelCase")]
pub enum OperationOutcome {
    Completed,
    Failed(String),
}

impl OperationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}
