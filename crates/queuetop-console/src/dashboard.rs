//! The coordination loop.
//!
//! `Dashboard` is the only owner of the current snapshot, the sort spec
//! and the viewport. The poll loop and the input thread talk to it over
//! channels; every state change happens here, between renders.

use ratatui::{backend::Backend, Terminal};
use thiserror::Error;
use tokio::sync::mpsc;

use queuetop_network::SourceError;
use queuetop_protocol::{Snapshot, SortKey, SortSpec};
use queuetop_state::{sort_snapshot, Viewport};

use crate::events::{drain_scroll, ControlEvent};
use crate::poller::PollUpdate;
use crate::tui::{self, View};

/// Reasons the dashboard stops other than a user quit.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("Status poller stopped unexpectedly")]
    PollerStopped,
}

/// Receiving ends of the channels feeding the coordination loop.
pub struct DashboardChannels {
    pub updates: mpsc::Receiver<PollUpdate>,
    pub control: mpsc::Receiver<ControlEvent>,
    pub scroll: mpsc::Receiver<i8>,
}

/// What the loop should do after handling a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    Idle,
    Quit,
}

pub struct Dashboard<B: Backend> {
    terminal: Terminal<B>,
    snapshot: Option<Snapshot>,
    sort: SortSpec,
    viewport: Viewport,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(terminal: Terminal<B>, sort: SortSpec) -> Self {
        Self {
            terminal,
            snapshot: None,
            sort,
            viewport: Viewport::default(),
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn total_rows(&self) -> usize {
        self.snapshot.as_ref().map_or(0, Snapshot::len)
    }

    /// Replace the current table with a freshly polled one.
    pub fn publish(&mut self, mut snapshot: Snapshot) {
        sort_snapshot(&mut snapshot, self.sort);
        self.viewport.clamp(snapshot.len());
        self.snapshot = Some(snapshot);
    }

    /// Apply a sort key-press and reorder the current table.
    pub fn press_sort(&mut self, key: SortKey) {
        self.sort.press(key);
        tracing::debug!(key = key.label(), ascending = self.sort.ascending, "Sort changed");
        if let Some(snapshot) = self.snapshot.as_mut() {
            sort_snapshot(snapshot, self.sort);
        }
    }

    /// Apply a batch of scroll deltas. Returns whether a redraw is needed.
    pub fn scroll(&mut self, deltas: Vec<i8>) -> bool {
        let total = self.total_rows();
        self.viewport.apply_deltas(deltas, total)
    }

    pub fn handle_update(&mut self, update: PollUpdate) -> Result<Flow, DashboardError> {
        match update {
            PollUpdate::Snapshot(snapshot) => {
                self.publish(snapshot);
                Ok(Flow::Redraw)
            }
            PollUpdate::Failed(e) => Err(DashboardError::Source(e)),
        }
    }

    pub fn handle_control(&mut self, event: ControlEvent) -> Flow {
        match event {
            ControlEvent::Quit => Flow::Quit,
            ControlEvent::Sort(key) => {
                self.press_sort(key);
                Flow::Redraw
            }
            ControlEvent::Resize { width, height } => {
                tracing::debug!(width, height, "Terminal resized");
                self.viewport
                    .resize(Viewport::rows_for_height(height), self.total_rows());
                Flow::Redraw
            }
            ControlEvent::Redraw => Flow::Redraw,
        }
    }

    /// Draw the current state. The visible row count is taken from the
    /// terminal size and the position re-clamped before drawing.
    pub fn redraw(&mut self) -> Result<(), DashboardError> {
        let size = self.terminal.size()?;
        let total = self.total_rows();
        self.viewport
            .resize(Viewport::rows_for_height(size.height), total);

        let view = View {
            snapshot: self.snapshot.as_ref(),
            sort: self.sort,
            viewport: self.viewport,
        };
        self.terminal.draw(|frame| tui::render(frame, &view))?;
        Ok(())
    }

    /// Run until quit, a source failure or a terminal error.
    pub async fn run(&mut self, mut channels: DashboardChannels) -> Result<(), DashboardError> {
        self.redraw()?;
        let mut interrupts = true;

        loop {
            let flow = tokio::select! {
                update = channels.updates.recv() => match update {
                    Some(update) => self.handle_update(update)?,
                    None => return Err(DashboardError::PollerStopped),
                },
                event = channels.control.recv() => match event {
                    Some(event) => self.handle_control(event),
                    None => Flow::Quit,
                },
                Some(delta) = channels.scroll.recv() => {
                    let deltas = drain_scroll(delta, &mut channels.scroll);
                    if self.scroll(deltas) { Flow::Redraw } else { Flow::Idle }
                }
                signal = tokio::signal::ctrl_c(), if interrupts => {
                    interrupt_flow(signal, &mut interrupts)
                }
            };

            match flow {
                Flow::Redraw => self.redraw()?,
                Flow::Idle => {}
                Flow::Quit => {
                    tracing::info!("Exiting");
                    return Ok(());
                }
            }
        }
    }
}

/// Outcome of waiting for an interrupt. A handler that cannot be installed
/// disables the branch instead of quitting; `q` still works.
fn interrupt_flow(signal: std::io::Result<()>, armed: &mut bool) -> Flow {
    match signal {
        Ok(()) => {
            tracing::info!("Interrupted");
            Flow::Quit
        }
        Err(e) => {
            tracing::warn!(error = %e, "Interrupt handler unavailable");
            *armed = false;
            Flow::Idle
        }
    }
}
