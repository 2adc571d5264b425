// churn CLI entry point.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod context;
mod exit_code;
mod git;
mod output;
mod pacer;
mod watcher;

use context::RunContext;
use exit_code::ExitCode;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "churn", version, about = "Generate filesystem churn for auto-commit agents")]
struct Cli {
    /// Force JSON output.
    #[arg(long, global = true)]
    json: bool,

    /// Run against this directory instead of the current one.
    #[arg(short = 'C', long = "dir", global = true, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Config file (defaults to `<dir>/.churn.toml` when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::detect(cli.json);

    let result = RunContext::load(cli.dir, cli.config.as_deref(), format)
        .and_then(|ctx| commands::run(cli.command, &ctx));

    match result {
        Ok(code) => code,
        Err(error) => {
            tracing::debug!(error = ?error, "command failed");
            output::print_anyhow_error(format, &error);
            ExitCode::from_error(&error).into()
        }
    }
}
