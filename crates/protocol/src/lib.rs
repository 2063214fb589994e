//! # sf-protocol
//!
//! Core protocol definitions and data models for sdlc-flow.
//!
//! This crate defines all shared data structures used for:
//! - Agent identities, statuses and the canonical phase order
//! - Operation lists and the payload handed from one agent to the next
//! - Configuration parsing (`.sdlc-flow/config.toml`)
//! - Inter-process communication between front ends and Core
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent names, categories and statuses
//! - [`operation_models`]: Operations and their outcomes
//! - [`payload_models`]: Agent payloads and run input
//! - [`config_models`]: Global configuration from config.toml
//! - [`workflow_models`]: Runtime workflow and run snapshots
//! - [`ipc`]: Operations and Events for Core-UI communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid, chrono, thiserror
//! - TypeScript generation: All types derive `TS` for web client compatibility
//! - Independent compilation: No dependencies on other sdlc-flow crates

pub mod agent_models;
pub mod config_models;
pub mod ipc;
pub mod operation_models;
pub mod payload_models;
pub mod workflow_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use ipc::*;
pub use operation_models::*;
pub use payload_models::*;
pub use workflow_models::*;
