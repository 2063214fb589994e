//! State management for agent workflows.
//!
//! This module provides:
//! - Agent run state machine logic
//! - WorkflowManager for coordinating the sequencer and runs

pub mod manager;
pub mod run;

pub use manager::{run_core, WorkflowManager};
