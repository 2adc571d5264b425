// Event debouncer for `churn observe`.
//
// A single burst pass touches each file several times in a few
// milliseconds (create, truncate, write). Events on the same path within
// the window (default 100ms, range 50–500ms) collapse into one report; the
// first kind seen is kept unless a later remove supersedes it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::{FsEventKind, RawFsEvent};

/// Default debounce window.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;
const MIN_DEBOUNCE_MS: u64 = 50;
const MAX_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    pub window: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { window: Duration::from_millis(DEFAULT_DEBOUNCE_MS) }
    }
}

impl DebounceConfig {
    /// Create a config with the given window in milliseconds, clamped to [50, 500].
    pub fn with_millis(ms: u64) -> Self {
        let clamped = ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS);
        Self { window: Duration::from_millis(clamped) }
    }
}

struct PendingEvent {
    kind: FsEventKind,
    last_seen: Instant,
}

/// Coalesces rapid events on the same path.
///
/// Call `push()` for each incoming event, then `drain_ready()` when
/// `next_deadline()` passes.
pub struct Debouncer {
    config: DebounceConfig,
    pending: HashMap<PathBuf, PendingEvent>,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self { config, pending: HashMap::new() }
    }

    pub fn push(&mut self, event: RawFsEvent) {
        self.push_at(event, Instant::now());
    }

    fn push_at(&mut self, event: RawFsEvent, now: Instant) {
        self.pending
            .entry(event.path)
            .and_modify(|pending| {
                pending.kind = merge_kinds(pending.kind, event.kind);
                pending.last_seen = now;
            })
            .or_insert(PendingEvent { kind: event.kind, last_seen: now });
    }

    /// Drain all events whose debounce window has elapsed, ordered by path.
    pub fn drain_ready(&mut self) -> Vec<RawFsEvent> {
        self.drain_ready_at(Instant::now())
    }

    fn drain_ready_at(&mut self, now: Instant) -> Vec<RawFsEvent> {
        let window = self.config.window;
        let mut ready = Vec::new();

        self.pending.retain(|path, pending| {
            if now.duration_since(pending.last_seen) >= window {
                ready.push(RawFsEvent { kind: pending.kind, path: path.clone() });
                false
            } else {
                true
            }
        });

        ready.sort_by(|a, b| a.path.cmp(&b.path));
        ready
    }

    /// Flush everything regardless of the window, e.g. on shutdown.
    pub fn drain_all(&mut self) -> Vec<RawFsEvent> {
        let mut all: Vec<RawFsEvent> = self
            .pending
            .drain()
            .map(|(path, pending)| RawFsEvent { kind: pending.kind, path })
            .collect();
        all.sort_by(|a, b| a.path.cmp(&b.path));
        all
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// When the earliest pending event becomes ready, or None if empty.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.last_seen + self.config.window).min()
    }
}

/// A create followed by writes is still a create; a remove always wins; a
/// create after a remove (atomic replace) reads as a modify.
fn merge_kinds(previous: FsEventKind, next: FsEventKind) -> FsEventKind {
    match (previous, next) {
        (_, FsEventKind::Remove) => FsEventKind::Remove,
        (FsEventKind::Remove, FsEventKind::Create) => FsEventKind::Modify,
        (FsEventKind::Remove, other) => other,
        (FsEventKind::Create, _) => FsEventKind::Create,
        (FsEventKind::Metadata, other) => other,
        (FsEventKind::Modify, _) => FsEventKind::Modify,
    }
}
