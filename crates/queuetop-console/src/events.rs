//! Terminal input decoding and the input thread.
//!
//! Raw crossterm events are turned into dashboard signals and sent to the
//! coordination loop over two channels: a control channel for sort,
//! resize, redraw and quit, and a bounded scroll channel. The scroll
//! channel applies backpressure to the input thread and is drained in one
//! go by the coordination loop, so a burst of arrow keys costs one redraw.

use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use queuetop_protocol::SortKey;

/// Capacity of the scroll delta channel.
pub const SCROLL_QUEUE_DEPTH: usize = 16;

/// Capacity of the control event channel.
pub const CONTROL_QUEUE_DEPTH: usize = 16;

/// Discrete signals for the coordination loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// A sort column key was pressed.
    Sort(SortKey),
    /// The terminal changed size.
    Resize { width: u16, height: u16 },
    /// Repaint the screen without any state change.
    Redraw,
    /// Leave the dashboard.
    Quit,
}

/// A decoded terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Control(ControlEvent),
    /// Move the viewport by one row: -1 up, +1 down.
    Scroll(i8),
}

/// Map a terminal event to a dashboard signal. Unbound keys, key
/// releases and mouse/focus events map to `None`.
pub fn decode(event: &Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => decode_key(key),
        Event::Resize(width, height) => Some(InputEvent::Control(ControlEvent::Resize {
            width: *width,
            height: *height,
        })),
        _ => None,
    }
}

fn decode_key(key: &KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let control = |event| Some(InputEvent::Control(event));
    match key.code {
        KeyCode::Char('c') if ctrl => control(ControlEvent::Quit),
        KeyCode::Char('l') if ctrl => control(ControlEvent::Redraw),
        KeyCode::Char('q') | KeyCode::Char('Q') => control(ControlEvent::Quit),
        KeyCode::Char(c) => SortKey::from_char(c).and_then(|key| control(ControlEvent::Sort(key))),
        KeyCode::Up => Some(InputEvent::Scroll(-1)),
        KeyCode::Down => Some(InputEvent::Scroll(1)),
        _ => None,
    }
}

/// Collect `first` plus every scroll delta already waiting in `rx`.
pub fn drain_scroll(first: i8, rx: &mut mpsc::Receiver<i8>) -> Vec<i8> {
    let mut deltas = vec![first];
    while let Ok(delta) = rx.try_recv() {
        deltas.push(delta);
    }
    if deltas.len() > 1 {
        tracing::debug!(count = deltas.len(), "Coalescing scroll events");
    }
    deltas
}

/// Spawn the blocking input reader on its own OS thread.
///
/// The thread exits after forwarding a quit, or when either channel is
/// closed. A terminal read error is logged and treated as a quit.
pub fn spawn_input_thread(
    control_tx: mpsc::Sender<ControlEvent>,
    scroll_tx: mpsc::Sender<i8>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("queuetop-input".into())
        .spawn(move || loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(error = %e, "Terminal input failed");
                    let _ = control_tx.blocking_send(ControlEvent::Quit);
                    return;
                }
            };
            tracing::trace!(?event, "Received terminal event");

            match decode(&event) {
                Some(InputEvent::Scroll(delta)) => {
                    if scroll_tx.blocking_send(delta).is_err() {
                        return;
                    }
                }
                Some(InputEvent::Control(control)) => {
                    if control_tx.blocking_send(control).is_err() || control == ControlEvent::Quit {
                        return;
                    }
                }
                None => {}
            }
        })
}
