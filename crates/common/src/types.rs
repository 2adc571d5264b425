// Descriptions of what a generation pass wrote, shared by the CLI's
// human and JSON renderers.

use serde::{Deserialize, Serialize};

/// Which template produced a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// `src/test_file_<secs>.ts`
    Source,
    /// `data/config.json`
    Config,
    /// An existing `package.json` that gained a script entry.
    Manifest,
    /// `test_git_functionality.md`
    Note,
}

impl FileKind {
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Source => "source",
            FileKind::Config => "config",
            FileKind::Manifest => "manifest",
            FileKind::Note => "note",
        }
    }
}

/// Whether the write produced a new path or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    Created,
    Updated,
}

/// One file written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the run directory, `/`-separated.
    pub path: String,
    pub kind: FileKind,
    pub action: WriteAction,
    pub bytes: usize,
}

/// What happened to the optional package manifest during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ManifestOutcome {
    /// No manifest at the configured path; nothing attempted.
    Absent,
    /// A script entry was added under `scripts`.
    Updated { script: String },
    /// The manifest exists but could not be updated. Not fatal.
    Skipped { reason: String },
}

/// Everything one burst pass wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// 1-based pass number within the burst.
    pub round: u32,
    pub timestamp: String,
    pub files: Vec<GeneratedFile>,
    pub manifest: ManifestOutcome,
}

impl PassReport {
    pub fn file(&self, kind: FileKind) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.kind == kind)
    }
}
