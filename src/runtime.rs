use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::quote::{FetchError, QuoteSource};
use crate::session::FetchTicket;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    Tick,
    Quote {
        ticket: FetchTicket,
        result: Result<String, FetchError>,
    },
    /// Terminal input can no longer be read; the loop must shut down
    InputClosed(String),
}

/// Source of terminal events (keyboard, resize, etc.) and fetch results
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Channel background work reports back on
    fn sender(&self) -> Sender<AppEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
                Ok(CtEvent::Paste(text)) => AppEvent::Paste(text),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    tracing::error!(error = %err, "terminal event reader stopped");
                    let _ = input_tx.send(AppEvent::InputClosed(err.to_string()));
                    break;
                }
            };

            if input_tx.send(evt).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
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

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source fed by the test through a channel
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Fetch a quote on a worker thread and post the result back as an event.
///
/// The worker never touches session state; the receiving loop decides whether
/// the ticket is still current.
pub fn spawn_fetch(source: Arc<dyn QuoteSource>, ticket: FetchTicket, tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        let result = source.fetch_random_quote();
        if tx.send(AppEvent::Quote { ticket, result }).is_err() {
            tracing::debug!(
                generation = ticket.generation(),
                "event loop gone before quote arrived"
            );
        }
    });
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout.
    /// A source that has gone away yields InputClosed instead of endless ticks.
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => AppEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => {
                AppEvent::InputClosed("event source disconnected".to_string())
            }
        }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.event_source.sender()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::FixedQuoteSource;
    use crate::session::SessionController;

    #[test]
    fn step_returns_tick_on_timeout() {
        let es = TestEventSource::new();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            AppEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let es = TestEventSource::new();
        es.sender().send(AppEvent::Resize).unwrap();
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            AppEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    /// Source whose producers have all gone away
    struct ClosedEventSource {
        tx: Sender<AppEvent>,
    }

    impl AppEventSource for ClosedEventSource {
        fn recv_timeout(&self, _timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
            Err(RecvTimeoutError::Disconnected)
        }

        fn sender(&self) -> Sender<AppEvent> {
            self.tx.clone()
        }
    }

    #[test]
    fn step_reports_closed_source() {
        let (tx, _rx) = mpsc::channel();
        let runner = Runner::new(
            ClosedEventSource { tx },
            FixedTicker::new(Duration::from_millis(1)),
        );

        match runner.step() {
            AppEvent::InputClosed(_) => {}
            other => panic!("expected InputClosed, got {other:?}"),
        }
    }

    #[test]
    fn spawn_fetch_posts_quote_event() {
        let runner = Runner::new(
            TestEventSource::new(),
            FixedTicker::new(Duration::from_millis(10)),
        );
        let mut session = SessionController::default();
        let ticket = session.start();

        spawn_fetch(
            Arc::new(FixedQuoteSource::new("from worker")),
            ticket,
            runner.sender(),
        );

        for _ in 0..200u32 {
            if let AppEvent::Quote { ticket: t, result } = runner.step() {
                assert_eq!(t, ticket);
                assert_eq!(result.unwrap(), "from worker");
                return;
            }
        }
        panic!("quote event never arrived");
    }
}
