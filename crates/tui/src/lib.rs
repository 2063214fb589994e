//! # sf-tui
//!
//! Terminal User Interface for sdlc-flow.
//!
//! This crate provides the interactive TUI for selecting agents, supplying
//! project input and following each agent's operations. It communicates
//! with `sf-core` via channels using the `Op` and `Event` protocol defined
//! in `sf-protocol`.

pub mod app;
pub mod event_handler;
pub mod tui;
pub mod view;
pub mod widgets;

pub use app::App;
pub use tui::Tui;

use anyhow::Result;
use sf_core::agents::{DelayPolicy, Scheduler, SimulatedExecutor, TokioScheduler};
use sf_core::config::AppConfig;
use sf_core::{run_core, WorkflowManager};
use sf_protocol::Op;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the op and event channels.
const CHANNEL_CAPACITY: usize = 1024;

/// Run the interactive TUI until the user quits.
///
/// Spawns the core loop with a simulated executor configured from
/// `config`, pre-selects the configured default agents and hands the
/// terminal to [`App`].
pub async fn run_app(config: AppConfig) -> Result<()> {
    let (op_tx, op_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let timing = config.global.timing;
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler);
    let executor = SimulatedExecutor::new(DelayPolicy::from_timing(&timing), scheduler.clone());
    let manager = WorkflowManager::new(Arc::new(executor), scheduler, timing, event_tx);
    let core = tokio::spawn(run_core(manager, op_rx));

    let default_agents = config.default_agents();
    op_tx
        .send(Op::SelectAgents {
            agents: default_agents
                .iter()
                .map(|a| a.display_name().to_string())
                .collect(),
        })
        .await?;

    let mut tui = Tui::init()?;
    let mut app = App::new(op_tx.clone(), event_rx, default_agents);
    let result = app.run(&mut tui).await;
    tui.restore()?;

    let _ = op_tx.send(Op::Shutdown).await;
    let _ = core.await;

    result
}
