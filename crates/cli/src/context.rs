// Resolved run directory, configuration and output format shared by every
// subcommand.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::config::ChurnConfig;
use crate::output::OutputFormat;

#[derive(Debug, Clone)]
pub struct RunContext {
    /// Absolute directory that generated files are written under.
    pub root: PathBuf,
    pub config: ChurnConfig,
    pub format: OutputFormat,
}

impl RunContext {
    pub fn load(
        dir: Option<PathBuf>,
        config_path: Option<&Path>,
        format: OutputFormat,
    ) -> anyhow::Result<Self> {
        let root = resolve_root(dir)?;
        let config =
            ChurnConfig::load(&root, config_path).context("failed to load configuration")?;
        Ok(Self { root, config, format })
    }
}

fn resolve_root(dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let provided = dir.unwrap_or_else(|| PathBuf::from("."));
    let absolute = if provided.is_absolute() {
        provided
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(provided))
            .context("failed to resolve current working directory")?
    };

    if !absolute.is_dir() {
        bail!("run directory `{}` does not exist or is not a directory", absolute.display());
    }
    Ok(absolute)
}
