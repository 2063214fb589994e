//! Rendering of core events for the headless run.

use colored::Colorize;
use sf_protocol::{AgentName, AgentStatus, Event};
use std::io::Write;

/// Characters of a generated document shown in text output.
const PREVIEW_CHARS: usize = 200;

/// Writes events either as JSON lines or as human-readable colored text.
pub struct Printer<W> {
    json: bool,
    out: W,
}

impl<W: Write> Printer<W> {
    pub fn new(json: bool, out: W) -> Self {
        Self { json, out }
    }

    pub fn print(&mut self, event: &Event) -> anyhow::Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.out, event)?;
            writeln!(self.out)?;
        } else if let Some(line) = describe(event) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// One line of text for the event, or `None` for events that only matter
/// to a UI mirror.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::WorkflowInitialized { order } => {
            let names: Vec<&str> = order.iter().map(|a| a.short_name()).collect();
            format!("{} {}", "Workflow:".bold(), names.join(" -> "))
        }
        Event::AgentStatusUpdate { agent, status } => {
            format!("[{agent}] {}", colored_status(*status))
        }
        Event::OpenAgent {
            agent,
            previous_payload: Some(payload),
        } => format!(
            "{} {agent} with {}",
            "Opening".cyan(),
            payload.preview(PREVIEW_CHARS).dimmed()
        ),
        Event::OperationsLoaded {
            agent, operations, ..
        } => format!("[{agent}] {} operations loaded", operations.len()),
        Event::AgentLogChunk { agent, content } => log_line(*agent, content),
        Event::AgentTerminated { agent } => format!("[{agent}] {}", "terminated".yellow()),
        Event::WorkflowCompleted { final_payload } => {
            let summary = final_payload
                .as_ref()
                .map(|p| p.preview(PREVIEW_CHARS))
                .unwrap_or_default();
            format!("{} {summary}", "Workflow complete:".green().bold())
        }
        Event::WorkflowReset => "Workflow reset".to_string(),
        Event::Error { message } => format!("{} {message}", "error:".red().bold()),
        _ => return None,
    };
    Some(line)
}

fn log_line(agent: AgentName, content: &str) -> String {
    format!("  {} {content}", format!("{}:", agent.short_name()).dimmed())
}

fn colored_status(status: AgentStatus) -> colored::ColoredString {
    let label = format!("{status:?}");
    match status {
        AgentStatus::Pending => label.yellow(),
        AgentStatus::Running => label.green(),
        AgentStatus::Completed => label.cyan(),
        AgentStatus::Failed => label.red().bold(),
    }
}
