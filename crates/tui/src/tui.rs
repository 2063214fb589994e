//! Terminal setup and the merged input/redraw stream.
//!
//! `Tui` owns the ratatui terminal in raw mode with bracketed paste, and
//! turns crossterm input plus coalesced redraw requests into one stream
//! of [`TuiEvent`]s for the app loop.

use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event as TermEvent, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::pin::Pin;
use tokio::select;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::{Stream, StreamExt};

pub type TerminalBackend = CrosstermBackend<Stdout>;

/// Input and redraw events delivered to the app loop.
#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    /// Text pasted while bracketed paste is enabled.
    Paste(String),
    /// Time to redraw; also emitted on terminal resize.
    Draw,
}

pub struct Tui {
    terminal: Terminal<TerminalBackend>,
    redraw_tx: mpsc::UnboundedSender<()>,
    draw_tx: broadcast::Sender<()>,
}

impl Tui {
    /// Enter raw mode and the alternate screen.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnableBracketedPaste, EnterAlternateScreen)?;
        install_panic_hook();

        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        let (redraw_tx, redraw_rx) = mpsc::unbounded_channel();
        let (draw_tx, _) = broadcast::channel(1);
        tokio::spawn(coalesce_redraws(redraw_rx, draw_tx.clone()));

        Ok(Self {
            terminal,
            redraw_tx,
            draw_tx,
        })
    }

    /// Leave raw mode and the alternate screen.
    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn frame_requester(&self) -> FrameRequester {
        FrameRequester {
            redraw_tx: self.redraw_tx.clone(),
        }
    }

    /// Stream of key, paste and draw events.
    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        let mut input = crossterm::event::EventStream::new();
        let mut draw_rx = self.draw_tx.subscribe();

        Box::pin(async_stream::stream! {
            loop {
                select! {
                    Some(Ok(event)) = input.next() => {
                        match event {
                            TermEvent::Key(key) => yield TuiEvent::Key(key),
                            TermEvent::Paste(text) => yield TuiEvent::Paste(text),
                            TermEvent::Resize(_, _) => yield TuiEvent::Draw,
                            _ => {}
                        }
                    }
                    result = draw_rx.recv() => match result {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            yield TuiEvent::Draw;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        })
    }

    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Cheap handle for asking the app loop to redraw.
#[derive(Clone, Debug)]
pub struct FrameRequester {
    redraw_tx: mpsc::UnboundedSender<()>,
}

impl FrameRequester {
    pub fn schedule_frame(&self) {
        let _ = self.redraw_tx.send(());
    }
}

/// Collapse bursts of redraw requests into a single draw event.
///
/// Core events arrive in bursts (one status update per operation plus its
/// log line), so every pending request is drained before one draw is sent.
async fn coalesce_redraws(
    mut redraw_rx: mpsc::UnboundedReceiver<()>,
    draw_tx: broadcast::Sender<()>,
) {
    while redraw_rx.recv().await.is_some() {
        while redraw_rx.try_recv().is_ok() {}
        let _ = draw_tx.send(());
    }
}

/// Restore the terminal before the default panic output is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}
