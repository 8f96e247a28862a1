//! Single/double click disambiguation.
//!
//! A first click arms a short window. A second click on the same entry inside the
//! window activates it (plain directories only); otherwise the armed entry is
//! selected once the window lapses. Time comes from an injected [`Clock`].

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::entry::Entry;

pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(250);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Waiting for a possible second click until `deadline`.
    Armed { deadline: Instant },
    Select(Entry),
    Activate(Entry),
}

#[derive(Debug, Default)]
enum ClickState {
    #[default]
    Idle,
    Armed {
        entry: Entry,
        deadline: Instant,
    },
}

#[derive(Debug)]
pub struct ClickDisambiguator {
    window: Duration,
    state: ClickState,
}

impl Default for ClickDisambiguator {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK_WINDOW)
    }
}

impl ClickDisambiguator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: ClickState::Idle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            ClickState::Idle => None,
            ClickState::Armed { deadline, .. } => Some(*deadline),
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, ClickState::Armed { .. })
    }

    pub fn armed_entry(&self) -> Option<&Entry> {
        match &self.state {
            ClickState::Idle => None,
            ClickState::Armed { entry, .. } => Some(entry),
        }
    }

    /// Callers run [`ClickDisambiguator::poll`] first so a lapsed window commits its
    /// selection before the new click is considered.
    pub fn click(&mut self, entry: Entry, now: Instant) -> ClickOutcome {
        match std::mem::take(&mut self.state) {
            ClickState::Armed {
                entry: first,
                deadline,
            } if now < deadline && first.path == entry.path => {
                if entry.is_navigable() {
                    ClickOutcome::Activate(entry)
                } else {
                    ClickOutcome::Select(entry)
                }
            }
            // Idle, lapsed, or a different entry: this click starts a new gesture.
            _ => self.arm(entry, now),
        }
    }

    /// Commits the armed entry once its window has lapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Entry> {
        let lapsed =
            matches!(&self.state, ClickState::Armed { deadline, .. } if now >= *deadline);
        if !lapsed {
            return None;
        }
        match std::mem::take(&mut self.state) {
            ClickState::Armed { entry, .. } => Some(entry),
            ClickState::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = ClickState::Idle;
    }

    fn arm(&mut self, entry: Entry, now: Instant) -> ClickOutcome {
        let deadline = now + self.window;
        self.state = ClickState::Armed { entry, deadline };
        ClickOutcome::Armed { deadline }
    }
}
