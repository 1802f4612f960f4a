//! Terminal event source.
//!
//! A background thread polls crossterm and forwards keys and resizes; when
//! nothing arrives within the tick rate it sends a `Tick` instead, which the
//! loop uses to check its refresh deadline.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

/// Tick granularity of the engine loop.
pub const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
}

pub struct EventHandler {
    rx: Receiver<Event>,
    /// Kept alive to prevent channel closure.
    _tx: Sender<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let event_tx = tx.clone();

        thread::spawn(move || {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            Event::Key(key)
                        }
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        _ => continue,
                    }
                } else {
                    Event::Tick
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Receives the next event, blocking until one is available.
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
