// Read-only git queries used to check whether an auto-commit agent has
// produced branches in the run directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const BRANCH_FORMAT: &str =
    "--format=%(refname:short)%00%(objectname:short)%00%(committerdate:iso-strict)%00%(subject)";

#[derive(Debug, Error)]
pub enum GitError {
    #[error("`{}` is not inside a git work tree", .0.display())]
    NotARepository(PathBuf),

    #[error("failed to run `git {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {args}` failed: {stderr}")]
    Failed { args: String, stderr: String },
}

/// A local branch and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub commit: String,
    /// Committer date, ISO-8601 with offset.
    pub committed_at: String,
    pub subject: String,
}

pub fn is_work_tree(root: &Path) -> Result<bool, GitError> {
    let args = ["rev-parse", "--is-inside-work-tree"];
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| GitError::Spawn { args: args.join(" "), source })?;
    Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
}

/// Local branches whose name starts with `prefix`, most recent commit first.
pub fn list_branches(root: &Path, prefix: &str) -> Result<Vec<BranchInfo>, GitError> {
    if !is_work_tree(root)? {
        return Err(GitError::NotARepository(root.to_path_buf()));
    }

    let args = ["for-each-ref", "--sort=-committerdate", BRANCH_FORMAT, "refs/heads"];
    debug!(root = %root.display(), prefix, "listing branches");
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| GitError::Spawn { args: args.join(" "), source })?;

    if !output.status.success() {
        return Err(GitError::Failed {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(parse_branches(&String::from_utf8_lossy(&output.stdout), prefix))
}

/// Parse NUL-separated `for-each-ref` lines, keeping names with `prefix`.
fn parse_branches(raw: &str, prefix: &str) -> Vec<BranchInfo> {
    raw.lines()
        .filter_map(|line| {
            let mut fields = line.splitn(4, '\0');
            let name = fields.next()?.trim();
            if name.is_empty() || !name.starts_with(prefix) {
                return None;
            }
            Some(BranchInfo {
                name: name.to_string(),
                commit: fields.next().unwrap_or_default().to_string(),
                committed_at: fields.next().unwrap_or_default().to_string(),
                subject: fields.next().unwrap_or_default().to_string(),
            })
        })
        .collect()
}
