//! Debounced scheduling of local cache sweeps.
//!
//! Edits only push a deadline forward; the owning session decides when to
//! look at the clock and perform the write.

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_DEBOUNCE_MS: i64 = 750;

#[derive(Debug, Clone)]
pub struct SweepSchedule {
    debounce: Duration,
    due_at: Option<DateTime<Utc>>,
}

impl Default for SweepSchedule {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_DEBOUNCE_MS))
    }
}

impl SweepSchedule {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            due_at: None,
        }
    }

    /// Records an edit at `now`; the sweep becomes due one debounce window later.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.due_at = Some(now + self.debounce);
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns true (and clears the schedule) when a sweep is due at `now`.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.due_at {
            Some(due) if due <= now => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    /// Clears any pending sweep regardless of the deadline.
    pub fn take_pending(&mut self) -> bool {
        self.due_at.take().is_some()
    }
}
