//! Operation executor implementations.

pub mod scripted;
pub mod simulated;

pub use scripted::ScriptedExecutor;
pub use simulated::SimulatedExecutor;
