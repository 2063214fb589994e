//! Headless pipeline run.
//!
//! Starts the first agent with the supplied project and document, then
//! starts every successor as soon as the core opens it, confirming the
//! carried-over payload without user interaction.

use crate::output::Printer;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use sf_core::agents::{DelayPolicy, Scheduler, SimulatedExecutor, TokioScheduler};
use sf_core::config::load_config;
use sf_core::{run_core, WorkflowManager};
use sf_protocol::{AgentPayload, AgentStatus, Event, Op, RunInput};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, info};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Agents to run, comma separated (default: `default-agents` from config)
    #[arg(long, short, value_delimiter = ',')]
    pub agents: Vec<String>,

    /// Project name given to the first agent
    #[arg(long, short)]
    pub project: String,

    /// File holding the document given to the first agent
    #[arg(long, short)]
    pub document: PathBuf,

    /// Print events as JSON lines
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}

/// What to feed the workflow.
struct Plan {
    selection: Vec<String>,
    input: RunInput,
}

pub async fn run(root: &Path, args: RunArgs) -> Result<()> {
    let document = tokio::fs::read_to_string(&args.document)
        .await
        .with_context(|| format!("Failed to read document {}", args.document.display()))?;
    let config = load_config(root).await?;

    let selection = if args.agents.is_empty() {
        config
            .default_agents()
            .iter()
            .map(|a| a.display_name().to_string())
            .collect()
    } else {
        args.agents
    };
    debug!(?selection, source = ?config.source, "headless run");

    let timing = config.global.timing;
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler);
    let executor = SimulatedExecutor::new(DelayPolicy::from_timing(&timing), scheduler.clone());
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let manager = WorkflowManager::new(Arc::new(executor), scheduler, timing, event_tx);

    let plan = Plan {
        selection,
        input: RunInput::new(args.project, document),
    };
    let mut printer = Printer::new(args.json, std::io::stdout());
    drive(manager, event_rx, plan, &mut printer).await?;
    Ok(())
}

/// Run the workflow to completion, printing every event.
///
/// Returns the final payload, or an error as soon as a request is rejected
/// or an agent fails.
async fn drive<W: Write>(
    manager: WorkflowManager,
    mut event_rx: Receiver<Event>,
    plan: Plan,
    printer: &mut Printer<W>,
) -> Result<Option<AgentPayload>> {
    let (op_tx, op_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let core = tokio::spawn(run_core(manager, op_rx));

    op_tx
        .send(Op::SelectAgents {
            agents: plan.selection,
        })
        .await?;

    let mut first_input = Some(plan.input);
    let outcome = loop {
        let Some(event) = event_rx.recv().await else {
            break Err(anyhow!("Core stopped before the workflow completed"));
        };
        printer.print(&event)?;

        match event {
            Event::WorkflowInitialized { order } => {
                let Some(first) = order.first().copied() else {
                    break Err(anyhow!("No agents selected"));
                };
                let input = first_input.take().unwrap_or_default();
                info!(%first, "starting first agent");
                op_tx.send(Op::StartAgent { agent: first, input }).await?;
            }
            Event::OpenAgent { agent, .. } => {
                info!(%agent, "confirming carried-over payload");
                op_tx
                    .send(Op::StartAgent {
                        agent,
                        input: RunInput::carry_over(),
                    })
                    .await?;
            }
            Event::AgentStatusUpdate {
                agent,
                status: AgentStatus::Failed,
            } => break Err(anyhow!("{agent} failed")),
            Event::Error { message } => break Err(anyhow!(message)),
            Event::WorkflowCompleted { final_payload } => break Ok(final_payload),
            _ => {}
        }
    };

    let _ = op_tx.send(Op::Shutdown).await;
    let _ = core.await;
    outcome
}
