//! Agent catalog and operation execution.
//!
//! This module provides the fixed per-agent operation table, the
//! `OperationExecutor` trait the step runner delegates to, and the
//! `Scheduler` seam used to simulate (or skip) work delays.

pub mod adapters;
pub mod base;
pub mod catalog;

pub use adapters::{ScriptedExecutor, SimulatedExecutor};
pub use base::{DelayPolicy, InstantScheduler, OperationExecutor, Scheduler, TokioScheduler};
pub use catalog::{generated_document, operations_for};
