use std::sync::mpsc::Sender;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::quote::QuoteSource;
use crate::runtime::{spawn_fetch, AppEvent};
use crate::session::{InputOutcome, SessionController};
use crate::theme::ThemeMode;

/// The typing test as seen by the event loop: the session plus the quote
/// source it is refilled from.
pub struct App {
    pub session: SessionController,
    source: Arc<dyn QuoteSource>,
    events: Sender<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(source: Arc<dyn QuoteSource>, theme: ThemeMode, events: Sender<AppEvent>) -> Self {
        Self {
            session: SessionController::new(theme),
            source,
            events,
            should_quit: false,
        }
    }

    /// Begin the first session
    pub fn activate(&mut self) {
        let ticket = self.session.start();
        spawn_fetch(self.source.clone(), ticket, self.events.clone());
    }

    pub fn restart(&mut self) {
        let ticket = self.session.restart();
        spawn_fetch(self.source.clone(), ticket, self.events.clone());
    }

    /// Stop accepting fetch results and ask the loop to exit
    pub fn quit(&mut self) {
        self.session.shutdown();
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply one event. Returns true when the screen needs redrawing.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Tick => self.session.started_at().is_some() && self.session.accepts_input(),
            AppEvent::Resize => true,
            AppEvent::Quote { ticket, result } => {
                self.session.complete_fetch(ticket, result);
                true
            }
            AppEvent::Paste(text) => {
                if self.session.accepts_input() {
                    let value = format!("{}{}", self.session.input_text(), text);
                    self.session.on_input(value);
                }
                true
            }
            AppEvent::Key(key) => {
                self.handle_key(key);
                true
            }
            AppEvent::InputClosed(reason) => {
                tracing::error!(%reason, "terminal input closed, quitting");
                self.quit();
                false
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('r') if ctrl => self.restart(),
            KeyCode::Char('t') if ctrl => self.session.toggle_theme(),
            _ if self.session.accepts_input() => {
                self.edit_input(key);
            }
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('t') => self.session.toggle_theme(),
            KeyCode::Char('q') => self.quit(),
            _ => {}
        }
    }

    fn edit_input(&mut self, key: KeyEvent) -> Option<InputOutcome> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }

        let mut value = self.session.input_text().to_string();
        match key.code {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop()?;
            }
            _ => return None,
        }

        Some(self.session.on_input(value))
    }
}
