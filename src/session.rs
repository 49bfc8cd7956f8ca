use std::time::{Duration, Instant, SystemTime};

use crate::quote::FetchError;
use crate::theme::ThemeMode;
use crate::util::{word_count, words_per_minute};

/// Lifecycle stage of a typing session.
///
/// The typing data lives inside the variant that owns it, so a session can
/// never be both failed and finished, and a finished session always carries
/// its result.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Error(String),
    Ready {
        target: String,
        input: String,
        started_at: Option<Timestamp>,
    },
    Finished {
        target: String,
        started_at: Timestamp,
        finished_at: Timestamp,
        wpm: u32,
    },
}

/// A moment on both clocks: wall time for display, monotonic time for
/// measuring how long the typing took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    wall: SystemTime,
    mono: Instant,
}

impl Timestamp {
    pub fn new(wall: SystemTime, mono: Instant) -> Self {
        Self { wall, mono }
    }

    pub fn now() -> Self {
        Self::new(SystemTime::now(), Instant::now())
    }

    pub fn wall(&self) -> SystemTime {
        self.wall
    }

    pub fn mono(&self) -> Instant {
        self.mono
    }
}

/// Identifies the fetch issued by one `start()`. Results carrying an older
/// ticket are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// No session is accepting input (loading, failed or already finished)
    Ignored,
    Updated,
    Completed { wpm: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Pending,
}

/// Per-character comparison of the input against the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub chars: Vec<(char, CharState)>,
    /// Typed characters beyond the end of the target
    pub overflow: String,
}

/// WPM for a finished session: whitespace-delimited words in `target` over
/// the time between the first keystroke and the exact match.
pub fn compute_wpm(target: &str, started_at: Timestamp, finished_at: Timestamp) -> u32 {
    let elapsed = finished_at.mono.saturating_duration_since(started_at.mono);
    words_per_minute(word_count(target), elapsed)
}

/// Owns the state of one typing session and every transition on it
#[derive(Debug)]
pub struct SessionController {
    phase: Phase,
    theme: ThemeMode,
    generation: u64,
}

impl SessionController {
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            phase: Phase::Loading,
            theme,
            generation: 0,
        }
    }

    /// Enter Loading and hand out the ticket the fetch result must present
    pub fn start(&mut self) -> FetchTicket {
        self.generation += 1;
        self.phase = Phase::Loading;
        tracing::debug!(generation = self.generation, "session loading");
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Drop the current session, whatever its phase, and fetch a new text
    pub fn restart(&mut self) -> FetchTicket {
        tracing::info!(from = self.phase_name(), "restarting session");
        self.start()
    }

    /// Invalidate any fetch still in flight
    pub fn shutdown(&mut self) {
        self.generation += 1;
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<String, FetchError>,
    ) -> FetchApplied {
        if ticket.generation != self.generation || self.phase != Phase::Loading {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale quote"
            );
            return FetchApplied::Stale;
        }

        self.phase = match result {
            Ok(target) => {
                tracing::info!(words = word_count(&target), "quote loaded");
                Phase::Ready {
                    target,
                    input: String::new(),
                    started_at: None,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "error fetching text");
                Phase::Error(err.user_message().to_string())
            }
        };

        FetchApplied::Applied
    }

    pub fn on_input(&mut self, value: impl Into<String>) -> InputOutcome {
        self.on_input_at(value, Timestamp::now())
    }

    /// Replace the input with `value` as of `now`. The first call of a session
    /// starts the clock; an exact match with the target finishes it.
    pub fn on_input_at(&mut self, value: impl Into<String>, now: Timestamp) -> InputOutcome {
        let Phase::Ready {
            target,
            input,
            started_at,
        } = &mut self.phase
        else {
            return InputOutcome::Ignored;
        };

        let started_at = *started_at.get_or_insert(now);
        *input = value.into();

        if *input != *target {
            return InputOutcome::Updated;
        }

        let target = std::mem::take(target);
        let wpm = compute_wpm(&target, started_at, now);
        tracing::info!(wpm, "session finished");

        self.phase = Phase::Finished {
            target,
            started_at,
            finished_at: now,
            wpm,
        };

        InputOutcome::Completed { wpm }
    }

    pub fn toggle_theme(&mut self) {
        self.theme.toggle();
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target_text(&self) -> Option<&str> {
        match &self.phase {
            Phase::Ready { target, .. } | Phase::Finished { target, .. } => Some(target),
            Phase::Loading | Phase::Error(_) => None,
        }
    }

    pub fn input_text(&self) -> &str {
        match &self.phase {
            Phase::Ready { input, .. } => input,
            Phase::Finished { target, .. } => target,
            Phase::Loading | Phase::Error(_) => "",
        }
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        match &self.phase {
            Phase::Ready { started_at, .. } => started_at.map(|t| t.wall),
            Phase::Finished { started_at, .. } => Some(started_at.wall),
            Phase::Loading | Phase::Error(_) => None,
        }
    }

    pub fn finished_at(&self) -> Option<SystemTime> {
        match &self.phase {
            Phase::Finished { finished_at, .. } => Some(finished_at.wall),
            _ => None,
        }
    }

    pub fn words_per_minute(&self) -> Option<u32> {
        match &self.phase {
            Phase::Finished { wpm, .. } => Some(*wpm),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Time on the clock: frozen once finished, running against `now` while typing
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match &self.phase {
            Phase::Ready {
                started_at: Some(started_at),
                ..
            } => Some(now.saturating_duration_since(started_at.mono)),
            Phase::Finished {
                started_at,
                finished_at,
                ..
            } => Some(finished_at.mono.saturating_duration_since(started_at.mono)),
            _ => None,
        }
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    pub fn progress(&self) -> Option<Progress> {
        let target = self.target_text()?;
        let mut typed = self.input_text().chars();

        let chars = target
            .chars()
            .map(|expected| {
                let state = match typed.next() {
                    Some(c) if c == expected => CharState::Correct,
                    Some(_) => CharState::Incorrect,
                    None => CharState::Pending,
                };
                (expected, state)
            })
            .collect();

        Some(Progress {
            chars,
            overflow: typed.collect(),
        })
    }

    pub fn phase_name(&self) -> &'static str {
        match self.phase {
            Phase::Loading => "loading",
            Phase::Error(_) => "error",
            Phase::Ready { .. } => "ready",
            Phase::Finished { .. } => "finished",
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}
