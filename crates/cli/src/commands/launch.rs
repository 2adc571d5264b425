// `churn launch`: run another tool with extra directories ahead of `PATH`
// and exit with whatever the tool exits with.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{self, Command, ExitStatus};

use clap::Args;
use thiserror::Error;
use tracing::debug;

use crate::context::RunContext;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("search path entry cannot be used in PATH: {0}")]
    SearchPath(#[from] env::JoinPathsError),
}

#[derive(Debug, Args)]
pub struct LaunchArgs {
    /// Extra directory to search before PATH (repeatable, after launch.search_path).
    #[arg(long = "path", value_name = "DIR")]
    extra_path: Vec<PathBuf>,

    /// Program to run.
    #[arg(value_name = "PROGRAM")]
    program: OsString,

    /// Arguments passed through unchanged.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<OsString>,
}

pub fn run(args: LaunchArgs, ctx: &RunContext) -> anyhow::Result<process::ExitCode> {
    let prefix: Vec<PathBuf> = ctx
        .config
        .launch
        .search_path
        .iter()
        .chain(args.extra_path.iter())
        .map(|dir| absolutize(&ctx.root, dir))
        .collect();

    let status = launch(&ctx.root, &prefix, &args.program, &args.args)?;
    Ok(process::ExitCode::from(exit_status_code(status)))
}

/// Spawn `program` in `root` with inherited stdio and wait for it.
fn launch(
    root: &Path,
    prefix: &[PathBuf],
    program: &OsStr,
    args: &[OsString],
) -> Result<ExitStatus, LaunchError> {
    let path = search_path(prefix, env::var_os("PATH"))?;
    debug!(program = %program.to_string_lossy(), args = args.len(), "launching");

    Command::new(program)
        .args(args)
        .current_dir(root)
        .env("PATH", path)
        .status()
        .map_err(|source| LaunchError::Spawn { program: program.to_string_lossy().into_owned(), source })
}

/// `prefix` entries first, then the existing `PATH` entries.
fn search_path(prefix: &[PathBuf], current: Option<OsString>) -> Result<OsString, LaunchError> {
    let existing: Vec<PathBuf> =
        current.as_deref().map(|path| env::split_paths(path).collect()).unwrap_or_default();
    Ok(env::join_paths(prefix.iter().cloned().chain(existing))?)
}

fn absolutize(root: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        root.join(dir)
    }
}

/// The child's code when it has one; `128 + signal` when a unix signal
/// ended it; 1 otherwise. Codes outside a byte are reported as 1.
fn exit_status_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(1);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(1);
        }
    }

    1
}
