//! Test fixtures for building managers and sample project data.

use sf_core::agents::adapters::{ScriptedExecutor, SimulatedExecutor};
use sf_core::agents::base::{
    DelayPolicy, InstantScheduler, OperationExecutor, Scheduler, TokioScheduler,
};
use sf_core::WorkflowManager;
use sf_protocol::{Event, RunInput, TimingConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Capacity large enough that no test ever blocks on a full event channel.
pub const EVENT_CAPACITY: usize = 4096;

/// Manager whose operations complete immediately.
#[allow(dead_code)]
pub fn instant_manager() -> (WorkflowManager, mpsc::Receiver<Event>) {
    scripted_manager(ScriptedExecutor::success())
}

/// Manager with a custom executor and no delays.
#[allow(dead_code)]
pub fn scripted_manager(executor: ScriptedExecutor) -> (WorkflowManager, mpsc::Receiver<Event>) {
    manager_with(
        Arc::new(executor),
        Arc::new(InstantScheduler),
        TimingConfig::immediate(),
    )
}

/// Manager on the tokio clock with the default timing and 1-3s operations.
///
/// Use with `#[tokio::test(start_paused = true)]`.
#[allow(dead_code)]
pub fn simulated_manager() -> (WorkflowManager, mpsc::Receiver<Event>) {
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler);
    let timing = TimingConfig::default();
    let executor = SimulatedExecutor::new(DelayPolicy::from_timing(&timing), scheduler.clone());
    manager_with(Arc::new(executor), scheduler, timing)
}

/// Manager on the tokio clock where every operation takes exactly `ms`.
#[allow(dead_code)]
pub fn fixed_delay_manager(ms: u64) -> (WorkflowManager, mpsc::Receiver<Event>) {
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler);
    let timing = TimingConfig {
        min_operation_ms: ms,
        max_operation_ms: ms,
        ..TimingConfig::default()
    };
    let executor = SimulatedExecutor::new(
        DelayPolicy::fixed(Duration::from_millis(ms)),
        scheduler.clone(),
    );
    manager_with(Arc::new(executor), scheduler, timing)
}

fn manager_with(
    executor: Arc<dyn OperationExecutor>,
    scheduler: Arc<dyn Scheduler>,
    timing: TimingConfig,
) -> (WorkflowManager, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
    (WorkflowManager::new(executor, scheduler, timing, tx), rx)
}

/// Input for the first agent of a workflow.
#[allow(dead_code)]
pub fn project_input(project: &str) -> RunInput {
    RunInput::new(project, format!("# {project}\nBuild a thing."))
}

/// Create a temporary project directory with a `.sdlc-flow/config.toml`.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project(config_toml: &str) -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let config_dir = temp_dir.path().join(".sdlc-flow");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(config_dir.join("config.toml"), config_toml)?;
    Ok(temp_dir)
}
