use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent, KeyEventKind};

/// The study countdown advances once per tick.
pub const TICK_RATE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
}

/// Polls the terminal on a background thread and forwards key presses,
/// interleaved with a tick every `tick_rate`.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut next_tick = Instant::now() + tick_rate;
            loop {
                let timeout = next_tick.saturating_duration_since(Instant::now());

                if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        // Some terminals also report releases and repeats.
                        Ok(CEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            if tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                if Instant::now() >= next_tick {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    next_tick = Instant::now() + tick_rate;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
