// CLI subcommand dispatch.

use std::process;

use clap::Subcommand;

use crate::context::RunContext;
use crate::exit_code::ExitCode;

pub mod branches;
pub mod burst;
pub mod git_probe;
pub mod hello;
pub mod launch;
pub mod observe;

#[derive(Subcommand)]
pub enum Command {
    /// Print a greeting; the smallest possible run to trigger an agent
    Hello(hello::HelloArgs),
    /// Write source, config and manifest changes in paced rounds
    Burst(burst::BurstArgs),
    /// Write a markdown note and list the directory
    GitProbe(git_probe::GitProbeArgs),
    /// Run another program with an extended PATH and pass its exit code through
    Launch(launch::LaunchArgs),
    /// Watch the directory and report settled file changes
    Observe(observe::ObserveArgs),
    /// List branches created by the auto-commit agent
    Branches(branches::BranchesArgs),
}

pub fn run(cmd: Command, ctx: &RunContext) -> anyhow::Result<process::ExitCode> {
    match cmd {
        Command::Hello(args) => hello::run(args, ctx).map(|()| ExitCode::Success.into()),
        Command::Burst(args) => burst::run(args, ctx).map(|()| ExitCode::Success.into()),
        Command::GitProbe(args) => git_probe::run(args, ctx).map(|()| ExitCode::Success.into()),
        Command::Launch(args) => launch::run(args, ctx),
        Command::Observe(args) => observe::run(args, ctx).map(|()| ExitCode::Success.into()),
        Command::Branches(args) => branches::run(args, ctx).map(|()| ExitCode::Success.into()),
    }
}
