//! TUI application state and event loop.
//!
//! This module defines the main `App` struct that manages the TUI state
//! and the event loop using `tokio::select!`.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use sf_protocol::{AgentName, Event, Op};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_stream::StreamExt;

use crate::event_handler;
use crate::tui::{Tui, TuiEvent};
use crate::view::WorkflowView;
use crate::widgets::dashboard::render_dashboard;
use crate::widgets::DetailView;

/// Lines moved by PageUp/PageDown in the detail view.
const PAGE_SIZE: usize = 10;

/// Main TUI application state.
///
/// This struct holds all the state needed to render the UI and process events.
pub struct App {
    /// Mirror of the workflow, built from core events.
    pub view: WorkflowView,
    /// Index of the agent selected in the dashboard.
    pub selected_index: usize,
    /// Current command input from the user.
    pub command_input: String,
    /// Selection used by a bare `/select`.
    pub default_agents: Vec<AgentName>,
    pub detail_view: DetailView,
    /// Channel to send operations to the core.
    pub op_tx: Sender<Op>,
    /// Channel to receive events from the core.
    pub event_rx: Receiver<Event>,
    /// Flag to indicate if the application should exit.
    pub should_exit: bool,
}

impl App {
    /// Create a new App with communication channels.
    pub fn new(
        op_tx: Sender<Op>,
        event_rx: Receiver<Event>,
        default_agents: Vec<AgentName>,
    ) -> Self {
        Self {
            view: WorkflowView::default(),
            selected_index: 0,
            command_input: String::new(),
            default_agents,
            detail_view: DetailView::new(),
            op_tx,
            event_rx,
            should_exit: false,
        }
    }

    /// Main event loop.
    ///
    /// Uses `tokio::select!` to handle keyboard input and core events concurrently.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut tui_events = tui.event_stream();

        tui.frame_requester().schedule_frame();

        while !self.should_exit {
            select! {
                Some(event) = self.event_rx.recv() => {
                    self.handle_core_event(event);
                    tui.frame_requester().schedule_frame();
                }
                Some(tui_event) = tui_events.next() => {
                    self.handle_tui_event(tui, tui_event)?;
                }
            }
        }

        Ok(())
    }

    /// Handle events from the core (sf-core).
    fn handle_core_event(&mut self, event: Event) {
        // Follow the successor when the core opens its control surface.
        if let Event::OpenAgent { agent, .. } = &event {
            if let Some(index) = self.view.agents.iter().position(|a| a.name == *agent) {
                self.select(index);
            }
        }
        event_handler::handle_core_event(&mut self.view, event);
        if self.selected_index >= self.view.agents.len() {
            self.select(0);
        }
    }

    /// Handle TUI events (keyboard input, resize, draw).
    fn handle_tui_event(&mut self, tui: &mut Tui, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => {
                self.handle_key_event(key_event);
                tui.frame_requester().schedule_frame();
            }
            TuiEvent::Paste(pasted) => {
                self.command_input.push_str(pasted.trim_end_matches(['\r', '\n']));
                tui.frame_requester().schedule_frame();
            }
            TuiEvent::Draw => {
                tui.draw(|frame| {
                    self.render(frame);
                })?;
            }
        }
        Ok(())
    }

    /// Handle keyboard events.
    ///
    /// PageUp/PageDown and Shift+Up/Down scroll the detail view; everything
    /// else goes to the command line and the dashboard selection.
    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Press {
            let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);
            match key_event.code {
                KeyCode::Up if shift => {
                    self.detail_view.scroll_up();
                    return;
                }
                KeyCode::Down if shift => {
                    let max = self.detail_line_count().saturating_sub(1);
                    self.detail_view.scroll_down(max);
                    return;
                }
                KeyCode::PageUp => {
                    self.detail_view.page_up(PAGE_SIZE);
                    return;
                }
                KeyCode::PageDown => {
                    let max = self.detail_line_count().saturating_sub(1);
                    self.detail_view.page_down(PAGE_SIZE, max);
                    return;
                }
                _ => {}
            }
        }

        let previous = self.selected_index;
        self.should_exit = event_handler::handle_keyboard_event(
            key_event,
            &mut self.command_input,
            &mut self.selected_index,
            &mut self.view,
            &self.default_agents,
            &self.op_tx,
        );
        if self.selected_index != previous {
            self.detail_view.scroll_to_top();
        }
    }

    fn select(&mut self, index: usize) {
        if self.selected_index != index {
            self.selected_index = index;
            self.detail_view.scroll_to_top();
        }
    }

    fn selected_agent(&self) -> Option<AgentName> {
        self.view.agent_at(self.selected_index)
    }

    fn detail_line_count(&self) -> usize {
        self.selected_agent()
            .map(|agent| crate::widgets::detail_view::detail_lines(&self.view, agent).len())
            .unwrap_or(0)
    }

    /// Render the TUI.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Dashboard (top), detail (middle), command (bottom)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(area);

        render_dashboard(frame, chunks[0], &self.view, self.selected_index);
        self.detail_view
            .render(frame, chunks[1], &self.view, self.selected_agent());
        self.render_command_input(frame, chunks[2]);
    }

    /// Render the command input area with the latest notice.
    fn render_command_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Command (/select /project /doc /start /terminate /close /reset, q to quit)");

        let notice = self.view.notice.as_deref().unwrap_or("");
        let text = format!("> {}\n{notice}", self.command_input);
        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(paragraph, area);
    }
}
