// `churn observe`: watch the run directory and report settled changes,
// the local stand-in for "check the agent's logs".

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use churn_common::fixture::display_rel;
use churn_common::stamp::Stamp;

use crate::context::RunContext;
use crate::output;
use crate::watcher::debounce::{DebounceConfig, Debouncer};
use crate::watcher::{FileWatcher, FsEventKind, RawFsEvent, WatchFilter};

#[derive(Debug, Args)]
pub struct ObserveArgs {
    /// Stop after this many seconds (runs until Ctrl-C when omitted).
    #[arg(long, value_name = "SECS")]
    duration_secs: Option<u64>,

    /// Debounce window in milliseconds [config: observe.debounce_ms, default 100].
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Also report permission and timestamp changes.
    #[arg(long)]
    all: bool,
}

/// One settled change.
#[derive(Debug, Clone, Serialize)]
pub struct ObservedChange {
    pub kind: FsEventKind,
    /// Path relative to the watched directory.
    pub path: String,
    pub at: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ObserveSummary {
    pub changes: usize,
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub metadata: usize,
}

impl ObserveSummary {
    fn record(&mut self, kind: FsEventKind) {
        self.changes += 1;
        match kind {
            FsEventKind::Create => self.created += 1,
            FsEventKind::Modify => self.modified += 1,
            FsEventKind::Remove => self.removed += 1,
            FsEventKind::Metadata => self.metadata += 1,
        }
    }
}

pub fn run(args: ObserveArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let debounce = DebounceConfig::with_millis(
        args.debounce_ms.unwrap_or(ctx.config.observe.debounce_ms),
    );
    let filter = WatchFilter { include_metadata: args.all };
    let duration = args.duration_secs.map(Duration::from_secs);
    let format = ctx.format;
    let root = ctx.root.clone();

    let observe_and_report = async move {
        let (watcher, rx) = FileWatcher::start(&root, filter)?;
        info!(root = %watcher.root().display(), "observing file changes");
        let stop = async move {
            match duration {
                Some(limit) => tokio::time::sleep(limit).await,
                None => {
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        };
        let summary = observe(watcher.root(), rx, debounce, stop, |change| {
            output::print_output(format, change, format_change)
        })
        .await?;
        output::print_output(format, &summary, format_summary)?;
        anyhow::Ok(())
    };

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(observe_and_report)
}

/// Pump raw events through the debouncer until `stop` resolves or the
/// watcher goes away. Pending events are flushed before returning.
pub async fn observe<S, E>(
    root: &Path,
    mut rx: mpsc::Receiver<RawFsEvent>,
    config: DebounceConfig,
    stop: S,
    mut emit: E,
) -> anyhow::Result<ObserveSummary>
where
    S: std::future::Future<Output = ()>,
    E: FnMut(&ObservedChange) -> io::Result<()>,
{
    let mut debouncer = Debouncer::new(config);
    let mut summary = ObserveSummary::default();
    tokio::pin!(stop);

    loop {
        let deadline = debouncer.next_deadline();
        tokio::select! {
            _ = &mut stop => break,
            received = rx.recv() => match received {
                Some(event) => debouncer.push(event),
                None => {
                    debug!("watcher channel closed");
                    break;
                }
            },
            _ = sleep_until(deadline) => {
                for event in debouncer.drain_ready() {
                    report(root, event, &mut summary, &mut emit)?;
                }
            }
        }
    }

    for event in debouncer.drain_all() {
        report(root, event, &mut summary, &mut emit)?;
    }
    Ok(summary)
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

fn report<E>(
    root: &Path,
    event: RawFsEvent,
    summary: &mut ObserveSummary,
    emit: &mut E,
) -> anyhow::Result<()>
where
    E: FnMut(&ObservedChange) -> io::Result<()>,
{
    summary.record(event.kind);
    let change = ObservedChange {
        kind: event.kind,
        path: relative_to(root, &event.path),
        at: Stamp::now().iso(),
    };
    emit(&change)?;
    Ok(())
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).map(display_rel).unwrap_or_else(|_| path.display().to_string())
}

fn format_change(change: &ObservedChange) -> String {
    format!("{} {:<8} {}", change.at, change.kind.label(), change.path)
}

fn format_summary(summary: &ObserveSummary) -> String {
    format!(
        "Observed {} change(s): {} created, {} modified, {} removed",
        summary.changes, summary.created, summary.modified, summary.removed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn raw(kind: FsEventKind, path: PathBuf) -> RawFsEvent {
        RawFsEvent { kind, path }
    }

    #[tokio::test]
    async fn coalesces_and_flushes_on_stop() {
        let root = PathBuf::from("/w");
        let (tx, rx) = mpsc::channel(16);
        tx.send(raw(FsEventKind::Create, root.join("src/a.ts"))).await.unwrap();
        tx.send(raw(FsEventKind::Modify, root.join("src/a.ts"))).await.unwrap();
        tx.send(raw(FsEventKind::Modify, root.join("data/config.json"))).await.unwrap();

        let mut seen = Vec::new();
        let summary = observe(
            &root,
            rx,
            DebounceConfig::default(),
            tokio::time::sleep(Duration::from_millis(20)),
            |change| {
                seen.push((change.kind, change.path.clone()));
                Ok(())
            },
        )
        .await
        .unwrap();

        drop(tx);
        assert_eq!(summary.changes, 2);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.modified, 1);
        assert_eq!(
            seen,
            vec![
                (FsEventKind::Modify, "data/config.json".to_string()),
                (FsEventKind::Create, "src/a.ts".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn settled_events_are_emitted_before_stop() {
        let root = PathBuf::from("/w");
        let (tx, rx) = mpsc::channel(16);
        tx.send(raw(FsEventKind::Remove, root.join("old.md"))).await.unwrap();

        let mut seen = 0;
        let summary = observe(
            &root,
            rx,
            DebounceConfig::with_millis(50),
            tokio::time::sleep(Duration::from_millis(300)),
            |_| {
                seen += 1;
                Ok(())
            },
        )
        .await
        .unwrap();

        drop(tx);
        assert_eq!(seen, 1);
        assert_eq!(summary.removed, 1);
    }

    #[tokio::test]
    async fn closed_channel_ends_observation() {
        let (tx, rx) = mpsc::channel::<RawFsEvent>(1);
        drop(tx);
        let summary = observe(
            Path::new("/w"),
            rx,
            DebounceConfig::default(),
            std::future::pending::<()>(),
            |_| Ok(()),
        )
        .await
        .unwrap();
        assert_eq!(summary.changes, 0);
    }

    #[tokio::test]
    async fn real_watcher_sees_generated_file() {
        let tmp = tempfile::tempdir().unwrap();
        let (watcher, rx) = FileWatcher::start(tmp.path(), WatchFilter::default()).unwrap();
        let root = watcher.root().to_path_buf();
        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(root.join("config.json"), "{}").unwrap();

        let mut paths = Vec::new();
        let summary = observe(
            &root,
            rx,
            DebounceConfig::default(),
            tokio::time::sleep(Duration::from_millis(1500)),
            |change| {
                paths.push(change.path.clone());
                Ok(())
            },
        )
        .await
        .unwrap();

        assert!(summary.changes >= 1);
        assert!(paths.iter().any(|p| p == "config.json"));
    }

    #[test]
    fn paths_outside_root_stay_absolute() {
        assert_eq!(relative_to(Path::new("/w"), Path::new("/w/src/a.ts")), "src/a.ts");
        assert_eq!(relative_to(Path::new("/w"), Path::new("/elsewhere/x")), "/elsewhere/x");
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut summary = ObserveSummary::default();
        summary.record(FsEventKind::Create);
        summary.record(FsEventKind::Metadata);
        summary.record(FsEventKind::Create);
        assert_eq!(summary.changes, 3);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.metadata, 1);
        assert_eq!(
            format_summary(&summary),
            "Observed 3 change(s): 2 created, 0 modified, 0 removed"
        );
    }
}
