//! Timed events and the duplicate-request cache.

use std::collections::{HashSet, VecDeque};
use std::time::SystemTime;

use strum::Display;

/// Work scheduled for a later instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// Regenerate the data-channel key.
    KeyExpiry,
    /// Check connections for ping timeouts.
    PingCheck,
}

/// An event and when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    /// What to do.
    pub kind: EventKind,
    /// When to do it.
    pub at: SystemTime,
}

/// Pending events ordered by firing time.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<ScheduledEvent>,
}

impl EventQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` at `at`, keeping the queue sorted.
    pub fn schedule(&mut self, kind: EventKind, at: SystemTime) {
        let position = self.events.partition_point(|event| event.at <= at);
        self.events.insert(position, ScheduledEvent { kind, at });
    }

    /// Removes and returns every event due at `now`.
    pub fn due(&mut self, now: SystemTime) -> Vec<ScheduledEvent> {
        let count = self.events.partition_point(|event| event.at <= now);
        self.events.drain(..count).collect()
    }

    /// Pending events in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.events.iter()
    }

    /// Next event without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.events.front()
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Remembers requests already handled so forwarded duplicates are dropped.
#[derive(Debug, Default)]
pub struct RequestTracker {
    seen: HashSet<String>,
}

impl RequestTracker {
    /// Empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `request`; returns `false` when it was already seen.
    pub fn record(&mut self, request: &str) -> bool {
        self.seen.insert(request.to_owned())
    }

    /// Number of remembered requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
