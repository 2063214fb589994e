//! Detail view widget for one agent's control surface.
//!
//! Shows the input the agent works from, its operation list with live
//! statuses and the run log, in a scrollable view. Supports keyboard
//! navigation (PageUp/PageDown) and shows a scrollbar to indicate position.

use crate::view::{WorkflowView, PREVIEW_CHARS};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use sf_protocol::{AgentName, OperationStatus};

/// Widget for displaying agent details with scrolling support.
pub struct DetailView {
    /// Current scroll offset (number of lines scrolled from the top).
    pub scroll_offset: usize,
}

impl DetailView {
    /// Create a new DetailView with scroll offset at the top.
    pub fn new() -> Self {
        Self { scroll_offset: 0 }
    }

    /// Render the detail view for `agent`.
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        view: &WorkflowView,
        agent: Option<AgentName>,
    ) {
        let title = match agent {
            Some(agent) => format!("Detail - {agent}"),
            None => "Detail".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        let lines = match agent {
            Some(agent) => detail_lines(view, agent),
            None => vec![Line::from("No agent selected.")],
        };
        let total_lines = lines.len();

        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, area);

        let visible_lines = area.height.saturating_sub(2) as usize;
        if total_lines > visible_lines {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total_lines)
                .viewport_content_length(visible_lines)
                .position(self.scroll_offset);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }

    /// Scroll up by one line.
    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll down by one line, never past `max`.
    pub fn scroll_down(&mut self, max: usize) {
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    /// Scroll up by a page (viewport height).
    pub fn page_up(&mut self, page_size: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
    }

    /// Scroll down by a page (viewport height).
    ///
    /// # Arguments
    ///
    /// * `page_size` - Number of lines in a page
    /// * `max` - The maximum scroll offset
    pub fn page_down(&mut self, page_size: usize, max: usize) {
        self.scroll_offset = (self.scroll_offset + page_size).min(max);
    }

    /// Reset scroll to the top.
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }
}

impl Default for DetailView {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines describing `agent`: input, operations, log and, once the workflow
/// is done, the final output.
pub fn detail_lines(view: &WorkflowView, agent: AgentName) -> Vec<Line<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(Span::styled(
        agent.description(),
        Style::default().fg(Color::Gray),
    ))];

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Input", heading)));
    if view.is_first(agent) {
        let project = if view.draft.project_name.trim().is_empty() {
            "(not set, use /project)".to_string()
        } else {
            view.draft.project_name.clone()
        };
        let document = view
            .draft
            .document_source
            .clone()
            .unwrap_or_else(|| "(not loaded, use /doc)".to_string());
        lines.push(Line::from(format!("Project: {project}")));
        lines.push(Line::from(format!("Document: {document}")));
    } else {
        let previous = view
            .open
            .as_ref()
            .filter(|open| open.agent == agent)
            .and_then(|open| open.previous_payload.as_ref());
        match previous {
            Some(payload) => {
                lines.push(Line::from(format!("Project: {}", payload.project_name)));
                lines.push(Line::from(format!(
                    "Previous output: {}",
                    payload.preview(PREVIEW_CHARS)
                )));
            }
            None => lines.push(Line::from("Waiting for the previous agent.")),
        }
    }

    if let Some(run) = view.runs.get(&agent) {
        lines.push(Line::default());
        let title = match run.cursor() {
            Some(i) => format!("Operations (running {} of {})", i + 1, run.operations.len()),
            None => "Operations".to_string(),
        };
        lines.push(Line::from(Span::styled(title, heading)));
        for (i, operation) in run.operations.iter().enumerate() {
            let (symbol, color) = operation_marker(operation.status);
            lines.push(Line::from(vec![
                Span::styled(format!("[{symbol}] "), Style::default().fg(color)),
                Span::raw(format!("{}. {}", i + 1, operation.title)),
                Span::styled(
                    format!(" - {}", operation.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Log", heading)));
        if run.logs.is_empty() {
            lines.push(Line::from("No logs yet."));
        } else {
            lines.extend(run.logs.iter().map(|log| Line::from(log.clone())));
        }
    }

    if let Some(payload) = view.payloads.get(&agent) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Output", heading)));
        lines.push(Line::from(payload.preview(PREVIEW_CHARS)));
    }

    if view.final_payload.is_some() && view.agents.last().map(|a| a.name) == Some(agent) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Workflow complete. Final output ready for review.",
            Style::default().fg(Color::Cyan),
        )));
    }

    lines
}

fn operation_marker(status: OperationStatus) -> (&'static str, Color) {
    match status {
        OperationStatus::Pending => (" ", Color::DarkGray),
        OperationStatus::Running => ("~", Color::Green),
        OperationStatus::Completed => ("x", Color::Cyan),
        OperationStatus::Failed => ("!", Color::Red),
    }
}
