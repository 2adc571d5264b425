// `churn hello`: the smallest possible run. Prints a greeting and touches
// nothing, so an agent that commits here is reacting to the process alone.

use clap::Args;
use serde::Serialize;

use crate::context::RunContext;
use crate::output;

pub const GREETING: [&str; 3] = [
    "Hello, Kibitz!",
    "Testing the optimized auto-commit system...",
    "This should trigger auto-commit and potentially branch creation.",
];

#[derive(Debug, Args)]
pub struct HelloArgs {}

#[derive(Debug, Serialize)]
pub struct HelloResult {
    pub lines: Vec<&'static str>,
}

pub fn run(_args: HelloArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let result = HelloResult { lines: GREETING.to_vec() };
    output::print_output(ctx.format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &HelloResult) -> String {
    result.lines.join("\n")
}
