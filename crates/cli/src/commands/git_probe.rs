// `churn git-probe`: drop a markdown note in the run directory so an agent
// that initializes git on first change has something to pick up, then show
// what the directory looks like.

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::debug;

use churn_common::fixture;
use churn_common::stamp::Stamp;
use churn_common::types::GeneratedFile;

use crate::context::RunContext;
use crate::output;

#[derive(Debug, Args)]
pub struct GitProbeArgs {}

#[derive(Debug, Serialize)]
pub struct ProbeResult {
    pub started_at: String,
    pub note: GeneratedFile,
    pub directory: String,
    /// Regular files directly in the run directory, sorted by name.
    pub files: Vec<String>,
}

pub fn run(_args: GitProbeArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let result = probe(&ctx.root, &ctx.config.probe.note_file, &Stamp::now())?;
    output::print_output(ctx.format, &result, format_human)?;
    Ok(())
}

fn probe(root: &Path, note_file: &Path, stamp: &Stamp) -> anyhow::Result<ProbeResult> {
    let note = fixture::write_note(root, note_file, stamp)
        .with_context(|| format!("failed to write probe note under {}", root.display()))?;
    debug!(path = %note.path, bytes = note.bytes, "wrote probe note");

    Ok(ProbeResult {
        started_at: stamp.iso(),
        note,
        directory: root.display().to_string(),
        files: list_files(root)?,
    })
}

fn list_files(root: &Path) -> anyhow::Result<Vec<String>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("failed to list {}", root.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", root.display()))?;
        // Follows symlinks, like a plain `is_file` check on the path.
        if entry.path().is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();
    Ok(files)
}

fn format_human(result: &ProbeResult) -> String {
    let mut lines = vec![
        "🧪 Testing Git initialization after BashCommand fix...".to_string(),
        format!("⏰ Test started at: {}", result.started_at),
        format!("✅ Created {}", result.note.path),
        "🔍 Check browser console for Git initialization logs".to_string(),
        "⏰ Auto-commit should trigger in 3 minutes if Git init works".to_string(),
        format!("📁 Current directory: {}", result.directory),
        "📄 Files in current directory:".to_string(),
    ];
    lines.extend(result.files.iter().map(|file| format!("  - {file}")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use churn_common::fixture::note::DEFAULT_FILE_NAME;
    use tempfile::TempDir;

    #[test]
    fn probe_writes_note_and_lists_only_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();

        let result = probe(tmp.path(), Path::new(DEFAULT_FILE_NAME), &Stamp::now()).unwrap();

        assert!(tmp.path().join(DEFAULT_FILE_NAME).is_file());
        assert_eq!(result.files, vec!["a.txt", "b.txt", DEFAULT_FILE_NAME]);
        assert_eq!(result.note.path, DEFAULT_FILE_NAME);
    }

    #[test]
    fn probe_overwrites_existing_note() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(DEFAULT_FILE_NAME), "old").unwrap();

        let result = probe(tmp.path(), Path::new(DEFAULT_FILE_NAME), &Stamp::now()).unwrap();
        assert_eq!(result.note.action, churn_common::types::WriteAction::Updated);
        let text = fs::read_to_string(tmp.path().join(DEFAULT_FILE_NAME)).unwrap();
        assert!(text.contains("# Git Test File"));
    }

    #[test]
    fn human_output_lists_files_as_bullets() {
        let tmp = TempDir::new().unwrap();
        let result = probe(tmp.path(), Path::new("probe.md"), &Stamp::now()).unwrap();
        let text = format_human(&result);
        assert!(text.contains("✅ Created probe.md"));
        assert!(text.ends_with("📄 Files in current directory:\n  - probe.md"));
    }
}
