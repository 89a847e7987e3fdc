//! Terminal event handling.

use color_eyre::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Terminal events.
#[derive(Debug)]
pub enum Event {
    /// Redraw tick, drives the spinner.
    Tick,
    /// Key press.
    Key(KeyEvent),
    /// Terminal resize; only wakes the loop for a redraw.
    Resize,
}

/// Forwards crossterm input and a redraw tick over a channel.
///
/// Polling runs on the blocking pool; sampling ticks are not produced here,
/// they come from the scanner itself.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                    polled = tokio::task::spawn_blocking(|| {
                        event::poll(Duration::from_millis(50))
                    }) => {
                        if !matches!(polled, Ok(Ok(true))) {
                            continue;
                        }
                        let Ok(evt) = event::read() else {
                            continue;
                        };
                        let event = match evt {
                            // Windows reports both press and release.
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            CrosstermEvent::Resize(..) => Some(Event::Resize),
                            _ => None,
                        };
                        if let Some(event) = event
                            && tx.send(event).is_err()
                        {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx }
    }

    /// Get the next event.
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| color_eyre::eyre::eyre!("Event channel closed"))
    }
}
