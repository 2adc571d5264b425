// `churn burst`: write a pass of fixture files, then wait in rounds so an
// auto-commit agent has time to notice, writing another pass after every
// wait but the last.

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use churn_common::fixture::{self, BurstLayout};
use churn_common::stamp::Stamp;
use churn_common::types::{FileKind, ManifestOutcome, PassReport};

use crate::context::RunContext;
use crate::output;
use crate::pacer::{Pacer, SleepPacer};

#[derive(Debug, Args)]
pub struct BurstArgs {
    /// Number of waits after the first pass [config: burst.rounds, default 3].
    #[arg(long)]
    rounds: Option<u32>,

    /// Length of each wait in seconds [config: burst.interval_secs, default 60].
    #[arg(long, value_name = "SECS")]
    interval_secs: Option<u64>,

    /// Write a single pass and exit without waiting.
    #[arg(long, conflicts_with_all = ["rounds", "interval_secs"])]
    no_wait: bool,

    /// Seed for generated identifiers and values, for reproducible content.
    #[arg(long)]
    seed: Option<u64>,
}

/// Resolved burst parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstPlan {
    pub rounds: u32,
    pub interval: Duration,
    pub layout: BurstLayout,
    pub branch_prefix: String,
}

impl BurstPlan {
    fn resolve(args: &BurstArgs, ctx: &RunContext) -> Self {
        let burst = &ctx.config.burst;
        let rounds = if args.no_wait { 0 } else { args.rounds.unwrap_or(burst.rounds) };
        let interval_secs = args.interval_secs.unwrap_or(burst.interval_secs);
        Self {
            rounds,
            interval: Duration::from_secs(interval_secs),
            layout: burst.layout(),
            branch_prefix: ctx.config.branches.prefix.clone(),
        }
    }

    /// Total time the agent is given after the first pass. Saturates
    /// instead of overflowing for huge intervals.
    pub fn window(&self) -> Duration {
        self.interval.checked_mul(self.rounds).unwrap_or(Duration::MAX)
    }
}

/// Progress emitted while a burst runs. JSON mode prints one per line.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BurstEvent {
    Started { directory: String },
    Pass(PassReport),
    AwaitingAgent { window_secs: u64 },
    Waiting { wait: u32, of: u32, seconds: u64 },
    Complete { passes: u32, branch_prefix: String },
}

pub fn run(args: BurstArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let plan = BurstPlan::resolve(&args, ctx);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let manifest_label = fixture::display_rel(&plan.layout.manifest);

    info!(
        root = %ctx.root.display(),
        rounds = plan.rounds,
        interval_secs = plan.interval.as_secs(),
        "starting burst"
    );
    execute(&ctx.root, &plan, &mut rng, &mut SleepPacer, Stamp::now, |event| {
        output::print_output(ctx.format, event, |event| format_human(event, &manifest_label))
    })?;
    Ok(())
}

/// Drive one burst. Returns the number of passes written.
pub fn execute<R, P, C, E>(
    root: &Path,
    plan: &BurstPlan,
    rng: &mut R,
    pacer: &mut P,
    mut clock: C,
    mut emit: E,
) -> anyhow::Result<u32>
where
    R: Rng + ?Sized,
    P: Pacer + ?Sized,
    C: FnMut() -> Stamp,
    E: FnMut(&BurstEvent) -> io::Result<()>,
{
    emit(&BurstEvent::Started { directory: root.display().to_string() })?;

    let mut passes = 1;
    let report = write_pass(root, plan, 1, rng, &clock())?;
    emit(&BurstEvent::Pass(report))?;

    if plan.rounds > 0 {
        emit(&BurstEvent::AwaitingAgent { window_secs: plan.window().as_secs() })?;
    }

    for wait in 1..=plan.rounds {
        emit(&BurstEvent::Waiting { wait, of: plan.rounds, seconds: plan.interval.as_secs() })?;
        pacer.pause(plan.interval);

        if wait < plan.rounds {
            passes += 1;
            let report = write_pass(root, plan, wait + 1, rng, &clock())?;
            emit(&BurstEvent::Pass(report))?;
        }
    }

    emit(&BurstEvent::Complete { passes, branch_prefix: plan.branch_prefix.clone() })?;
    Ok(passes)
}

fn write_pass<R: Rng + ?Sized>(
    root: &Path,
    plan: &BurstPlan,
    round: u32,
    rng: &mut R,
    stamp: &Stamp,
) -> anyhow::Result<PassReport> {
    let report = fixture::write_burst_pass(root, &plan.layout, round, rng, stamp)
        .with_context(|| format!("burst pass {round} failed"))?;

    for file in &report.files {
        debug!(round, path = %file.path, kind = file.kind.label(), bytes = file.bytes, "wrote fixture");
    }
    if let ManifestOutcome::Skipped { reason } = &report.manifest {
        warn!(round, %reason, "could not update manifest, continuing");
    }
    Ok(report)
}

fn format_human(event: &BurstEvent, manifest_label: &str) -> String {
    match event {
        BurstEvent::Started { directory } => {
            format!("🔧 Auto-commit test script starting...\n📁 Working directory: {directory}")
        }
        BurstEvent::Pass(report) => {
            let mut lines = Vec::new();
            if report.round > 1 {
                lines.push(format!("🔧 Creating additional changes (round {})...", report.round));
            }
            if let Some(source) = report.file(FileKind::Source) {
                lines.push(format!("✅ Created test file: {}", source.path));
            }
            if let Some(config) = report.file(FileKind::Config) {
                lines.push(format!("✅ Created/updated {}", config.path));
            }
            match &report.manifest {
                ManifestOutcome::Absent => {}
                ManifestOutcome::Updated { .. } => {
                    lines.push(format!("✅ Updated {manifest_label} with test script"));
                }
                ManifestOutcome::Skipped { reason } => {
                    lines.push(format!("⚠️ Could not update {manifest_label}: {reason}"));
                }
            }
            lines.join("\n")
        }
        BurstEvent::AwaitingAgent { window_secs } => format!(
            "\n🕐 Waiting for auto-commit agent to detect changes...\n\
             The auto-commit agent should create a branch within {}\n\
             Check the browser console for auto-commit agent logs",
            describe_window(*window_secs)
        ),
        BurstEvent::Waiting { wait, of, seconds } => {
            format!("\n⏰ Waiting {seconds} seconds... ({wait}/{of})")
        }
        BurstEvent::Complete { branch_prefix, .. } => format!(
            "\n✅ Test complete!\n\
             If auto-commit is working, you should see:\n\
             1. Console logs showing auto-commit agent cycles\n\
             2. New Git branches created with {branch_prefix} prefix\n\
             3. Commits with the changed files"
        ),
    }
}

fn describe_window(secs: u64) -> String {
    match secs {
        1 => "1 second".to_string(),
        s if s < 60 || s % 60 != 0 => format!("{s} seconds"),
        60 => "1 minute".to_string(),
        s => format!("{} minutes", s / 60),
    }
}
