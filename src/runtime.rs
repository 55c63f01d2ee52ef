use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEventKind};

pub const TICK_RATE_MS: u64 = 100;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum TrailEvent {
    /// Left button pressed at a terminal cell.
    Click { column: u16, row: u16 },
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (mouse, keyboard, resize)
pub trait TrailEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<TrailEvent, RecvTimeoutError>;
}

/// Production event source using crossterm. Mouse capture must be enabled
/// on the terminal for clicks to arrive.
pub struct CrosstermEventSource {
    rx: Receiver<TrailEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => Some(TrailEvent::Key(key)),
                Ok(CtEvent::Mouse(mouse)) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(TrailEvent::Click {
                        column: mouse.column,
                        row: mouse.row,
                    }),
                    _ => None,
                },
                Ok(CtEvent::Resize(_, _)) => Some(TrailEvent::Resize),
                Ok(_) => None,
                Err(err) => {
                    tracing::error!(%err, "terminal event read failed");
                    break;
                }
            };

            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrailEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TrailEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TrailEvent>) -> Self {
        Self { rx }
    }
}

impl TrailEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrailEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: TrailEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: TrailEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> TrailEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => TrailEvent::Tick,
        }
    }
}
