// Consistent exit codes for the churn CLI.
//
//   0   = success
//   1   = general error
//   2   = usage/config error
//   3   = not a git work tree
//   127 = launch target could not be started
//
// `churn launch` passes the child's own code through instead.

use std::process;

use crate::commands::launch::LaunchError;
use crate::config::ConfigError;
use crate::git::GitError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    NotGitRepository = 3,
    LaunchFailed = 127,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::Usage;
            }
            if let Some(git_err) = cause.downcast_ref::<GitError>() {
                if matches!(git_err, GitError::NotARepository(_)) {
                    return Self::NotGitRepository;
                }
            }
            if let Some(LaunchError::Spawn { .. }) = cause.downcast_ref::<LaunchError>() {
                return Self::LaunchFailed;
            }
        }
        Self::Error
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code())
    }
}
