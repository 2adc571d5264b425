// `churn branches`: list the branches an auto-commit agent created.

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::context::RunContext;
use crate::git::{self, BranchInfo};
use crate::output;

#[derive(Debug, Args)]
pub struct BranchesArgs {
    /// Branch name prefix to match [config: branches.prefix, default "auto-commit-"].
    #[arg(long)]
    prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BranchesResult {
    pub prefix: String,
    pub branches: Vec<BranchInfo>,
}

pub fn run(args: BranchesArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let prefix = args.prefix.unwrap_or_else(|| ctx.config.branches.prefix.clone());
    let branches = git::list_branches(&ctx.root, &prefix)
        .with_context(|| format!("failed to list `{prefix}` branches"))?;

    let result = BranchesResult { prefix, branches };
    output::print_output(ctx.format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &BranchesResult) -> String {
    if result.branches.is_empty() {
        return format!("No branches with prefix `{}` yet.", result.prefix);
    }

    let width = result.branches.iter().map(|b| b.name.len()).max().unwrap_or(0);
    let mut lines = vec![format!("{} branch(es) with prefix `{}`:", result.branches.len(), result.prefix)];
    for branch in &result.branches {
        lines.push(format!(
            "  {:<width$}  {}  {}  {}",
            branch.name, branch.commit, branch.committed_at, branch.subject
        ));
    }
    lines.join("\n")
}
