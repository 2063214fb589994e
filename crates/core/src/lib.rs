//! # sf-core
//!
//! Workflow engine for sdlc-flow.
//!
//! This crate provides:
//! - The pipeline sequencer deciding which agent is active and holding the
//!   payloads handed from one agent to the next
//! - The step runner executing an agent's operations one at a time
//! - The workflow manager serializing UI operations against both
//! - Configuration loading from the `.sdlc-flow/` directory
//!
//! ## Modules
//!
//! - [`sequencer`]: Execution order, agent statuses and payload hand-off
//! - [`engine`]: Step runner
//! - [`state`]: Run state machine and the workflow manager
//! - [`agents`]: Operation table and operation executors
//! - [`config`]: Configuration loading
//! - [`error`]: Workflow errors

pub mod agents;
pub mod config;
pub mod engine;
pub mod error;
pub mod sequencer;
pub mod state;

pub use error::{WorkflowError, WorkflowResult};
pub use sequencer::{Advance, PipelineSequencer};
pub use state::{run_core, WorkflowManager};
