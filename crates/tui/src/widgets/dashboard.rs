//! Dashboard widget for displaying the agent pipeline in a table.
//!
//! Each row shows one agent of the execution order with its category,
//! status and operation progress. The active agent is marked with `*`.

use crate::view::WorkflowView;
use ratatui::layout::Constraint;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Cell;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::TableState;
use ratatui::Frame;
use sf_protocol::AgentStatus;

/// Renders the dashboard as a table showing all selected agents.
///
/// # Arguments
/// * `frame` - The frame to render into
/// * `area` - The area to render the table in
/// * `view` - Current workflow mirror
/// * `selected` - Index of the currently selected agent
pub fn render_dashboard(frame: &mut Frame, area: Rect, view: &WorkflowView, selected: usize) {
    let rows: Vec<Row> = view
        .agents
        .iter()
        .enumerate()
        .map(|(i, agent)| {
            let status_style = Style::default().fg(status_color(agent.status));
            let marker = if agent.is_active { "*" } else { " " };
            let progress = view
                .progress(agent.name)
                .map(|(done, total)| format!("{done}/{total}"))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(format!("{marker}{}", i + 1)),
                Cell::from(agent.name.display_name()),
                Cell::from(format!("{:?}", agent.name.category())),
                Cell::from(format!("{:?}", agent.status)).style(status_style),
                Cell::from(progress),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Agent"),
        Cell::from("Category"),
        Cell::from("Status"),
        Cell::from("Ops"),
    ])
    .style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan),
    );

    let widths = [
        Constraint::Length(3),
        Constraint::Percentage(35),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(6),
    ];

    let title = if view.agents.is_empty() {
        "Dashboard - no agents selected (/select)".to_string()
    } else {
        "Dashboard - Agent Pipeline".to_string()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(Color::White)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !view.agents.is_empty() {
        table_state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut table_state);
}

fn status_color(status: AgentStatus) -> Color {
    match status {
        AgentStatus::Pending => Color::Yellow,
        AgentStatus::Running => Color::Green,
        AgentStatus::Completed => Color::Cyan,
        AgentStatus::Failed => Color::Red,
    }
}
