// Per-directory configuration: `<dir>/.churn.toml`.
//
// Every field is optional. A missing default file means defaults; a file
// that exists but does not parse is an error.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use churn_common::fixture::{manifest, note, BurstLayout};

use crate::watcher::debounce::DEFAULT_DEBOUNCE_MS;

pub const CONFIG_FILE_NAME: &str = ".churn.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ChurnConfig {
    pub burst: BurstConfig,
    pub probe: ProbeConfig,
    pub observe: ObserveConfig,
    pub launch: LaunchConfig,
    pub branches: BranchesConfig,
}

/// Pacing and file layout for `churn burst`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BurstConfig {
    /// Number of waits after the first pass.
    pub rounds: u32,
    /// Length of each wait.
    pub interval_secs: u64,
    pub source_dir: PathBuf,
    pub data_dir: PathBuf,
    /// Only touched when it already exists.
    pub manifest: PathBuf,
}

impl Default for BurstConfig {
    fn default() -> Self {
        let layout = BurstLayout::default();
        Self {
            rounds: 3,
            interval_secs: 60,
            source_dir: layout.source_dir,
            data_dir: layout.data_dir,
            manifest: layout.manifest,
        }
    }
}

impl BurstConfig {
    pub fn layout(&self) -> BurstLayout {
        BurstLayout {
            source_dir: self.source_dir.clone(),
            data_dir: self.data_dir.clone(),
            manifest: self.manifest.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub note_file: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { note_file: PathBuf::from(note::DEFAULT_FILE_NAME) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ObserveConfig {
    /// Debounce window in milliseconds, clamped to [50, 500].
    pub debounce_ms: u64,
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self { debounce_ms: DEFAULT_DEBOUNCE_MS }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    /// Directories placed ahead of `PATH` for the launched program.
    /// Relative entries resolve against the run directory.
    pub search_path: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BranchesConfig {
    pub prefix: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        Self { prefix: "auto-commit-".into() }
    }
}

impl ChurnConfig {
    /// Load config for `root`. An explicit path must exist; the default
    /// `<root>/.churn.toml` is optional.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = root.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Generated files must stay inside the run directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_contained("burst.source_dir", &self.burst.source_dir)?;
        ensure_contained("burst.data_dir", &self.burst.data_dir)?;
        ensure_contained("burst.manifest", &self.burst.manifest)?;
        ensure_contained("probe.note_file", &self.probe.note_file)?;

        if self.probe.note_file.file_name().is_none() {
            return Err(ConfigError::Invalid {
                field: "probe.note_file",
                reason: "must name a file".into(),
            });
        }
        if self.burst.manifest.file_name().is_none() {
            return Err(ConfigError::Invalid {
                field: "burst.manifest",
                reason: format!("must name a file such as `{}`", manifest::DEFAULT_FILE_NAME),
            });
        }
        Ok(())
    }
}

fn ensure_contained(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("`{}` must not contain `..`", path.display()),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("`{}` must be a relative path", path.display()),
                });
            }
        }
    }
    Ok(())
}
