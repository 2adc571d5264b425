// File watcher: fsevents/inotify → debounce → report.
// Used by `churn observe` to confirm that generated files are visible to
// anything watching the directory.

pub mod debounce;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

/// Raw filesystem event kind emitted by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsEventKind {
    /// File was created or first detected.
    Create,
    /// File content or name changed.
    Modify,
    /// File was deleted.
    Remove,
    /// Permissions or timestamps changed. Only reported on request.
    Metadata,
}

impl FsEventKind {
    pub fn label(self) -> &'static str {
        match self {
            FsEventKind::Create => "create",
            FsEventKind::Modify => "modify",
            FsEventKind::Remove => "remove",
            FsEventKind::Metadata => "metadata",
        }
    }
}

/// A raw filesystem event for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFsEvent {
    pub kind: FsEventKind,
    pub path: PathBuf,
}

/// What the watcher forwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchFilter {
    pub include_metadata: bool,
}

/// Capacity for the internal event channel.
const EVENT_CHANNEL_CAPACITY: usize = 512;

/// Directory names whose contents never reach the receiver. Git rewrites
/// these constantly while an auto-commit agent works.
const IGNORED_DIRS: &[&str] = &[".git"];

/// Watches a directory recursively using the OS-native file watcher
/// (fsevents on macOS, inotify on Linux).
///
/// Events are sent to the returned receiver. The watcher runs until dropped.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root` recursively.
    pub fn start(root: &Path, filter: WatchFilter) -> Result<(Self, mpsc::Receiver<RawFsEvent>)> {
        let root = root
            .canonicalize()
            .with_context(|| format!("failed to canonicalize watch root: {}", root.display()))?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let root_for_filter = root.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if let Some(raw_events) = translate_event(&event, &root_for_filter, filter) {
                        for raw in raw_events {
                            if tx.blocking_send(raw).is_err() {
                                debug!("event channel closed, stopping event dispatch");
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "file watcher error");
                }
            }
        })
        .context("failed to create file watcher")?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch directory: {}", root.display()))?;

        debug!(path = %root.display(), "file watcher started");

        Ok((Self { _watcher: watcher, root }, rx))
    }

    /// The canonicalized root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Returns true if any component of `path` below `root` is an ignored directory.
fn is_ignored(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root).map_or(false, |rel| {
        rel.components().any(|component| match component {
            Component::Normal(name) => IGNORED_DIRS.iter().any(|ignored| name == *ignored),
            _ => false,
        })
    })
}

/// Returns true if the path is inside the watched root (guards against symlink escapes).
fn is_inside_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Translate a `notify::Event` into zero or more `RawFsEvent`s.
fn translate_event(event: &Event, root: &Path, filter: WatchFilter) -> Option<Vec<RawFsEvent>> {
    let kind = match &event.kind {
        EventKind::Create(_) => FsEventKind::Create,
        EventKind::Modify(modify_kind) => {
            use notify::event::ModifyKind;
            match modify_kind {
                ModifyKind::Metadata(_) if filter.include_metadata => FsEventKind::Metadata,
                ModifyKind::Metadata(_) => {
                    trace!("skipping metadata-only modify event");
                    return None;
                }
                // Data, rename and unknown modify kinds all count as content changes.
                _ => FsEventKind::Modify,
            }
        }
        EventKind::Remove(_) => FsEventKind::Remove,
        // Access, Other, Any: reads and close notifications change nothing.
        _ => {
            trace!(kind = ?event.kind, "skipping non-content event");
            return None;
        }
    };

    let events: Vec<RawFsEvent> = event
        .paths
        .iter()
        .filter(|p| {
            if is_inside_root(p, root) {
                true
            } else {
                warn!(path = %p.display(), "ignoring event outside watch root (possible symlink escape)");
                false
            }
        })
        .filter(|p| !is_ignored(p, root))
        .map(|p| RawFsEvent { kind, path: p.clone() })
        .collect();

    if events.is_empty() {
        None
    } else {
        Some(events)
    }
}
