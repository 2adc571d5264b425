// Fixture writers: the files a burst pass or a git probe drops into the
// run directory so an external auto-commit agent has something to see.

pub mod config;
pub mod manifest;
pub mod note;
pub mod source;

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use crate::stamp::Stamp;
use crate::types::{FileKind, GeneratedFile, ManifestOutcome, PassReport, WriteAction};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest is not valid JSON: {source}")]
    ManifestParse {
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest root is not a JSON object")]
    ManifestNotObject,

    #[error("manifest `scripts` field is not a JSON object")]
    ScriptsNotObject,
}

/// Where a burst pass writes, relative to the run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurstLayout {
    pub source_dir: PathBuf,
    pub data_dir: PathBuf,
    pub manifest: PathBuf,
}

impl Default for BurstLayout {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            data_dir: PathBuf::from("data"),
            manifest: PathBuf::from(manifest::DEFAULT_FILE_NAME),
        }
    }
}

/// Write one burst pass: a stamped source file, `config.json`, and a script
/// entry in the manifest if one exists.
///
/// Source and config failures abort the pass. Manifest failures are
/// reported in [`PassReport::manifest`] and never abort.
pub fn write_burst_pass<R: Rng + ?Sized>(
    root: &Path,
    layout: &BurstLayout,
    round: u32,
    rng: &mut R,
    stamp: &Stamp,
) -> Result<PassReport, FixtureError> {
    let source_rel = layout.source_dir.join(source::file_name(stamp));
    let source_file =
        write_file(root, &source_rel, &source::render(rng, stamp), FileKind::Source)?;

    let config_text = config::ConfigFixture::generate(rng, stamp)
        .render()
        .map_err(|source| FixtureError::Serialize { what: "config fixture", source })?;
    let config_rel = layout.data_dir.join(config::FILE_NAME);
    let config_file = write_file(root, &config_rel, &config_text, FileKind::Config)?;

    let mut files = vec![source_file, config_file];
    let manifest = match update_manifest(root, &layout.manifest, stamp) {
        Ok(Some((script, file))) => {
            files.push(file);
            ManifestOutcome::Updated { script }
        }
        Ok(None) => ManifestOutcome::Absent,
        Err(error) => ManifestOutcome::Skipped { reason: error.to_string() },
    };

    Ok(PassReport { round, timestamp: stamp.iso(), files, manifest })
}

/// Write the git probe note at `rel` under `root`.
pub fn write_note(root: &Path, rel: &Path, stamp: &Stamp) -> Result<GeneratedFile, FixtureError> {
    write_file(root, rel, &note::render(stamp), FileKind::Note)
}

fn update_manifest(
    root: &Path,
    rel: &Path,
    stamp: &Stamp,
) -> Result<Option<(String, GeneratedFile)>, FixtureError> {
    let path = root.join(rel);
    if !path.exists() {
        return Ok(None);
    }

    let text = fs::read_to_string(&path)
        .map_err(|source| FixtureError::Read { path: path.clone(), source })?;
    let (script, rendered) = manifest::patch_text(&text, stamp)?;
    fs::write(&path, &rendered).map_err(|source| FixtureError::Write { path, source })?;

    let file = GeneratedFile {
        path: display_rel(rel),
        kind: FileKind::Manifest,
        action: WriteAction::Updated,
        bytes: rendered.len(),
    };
    Ok(Some((script, file)))
}

fn write_file(
    root: &Path,
    rel: &Path,
    contents: &str,
    kind: FileKind,
) -> Result<GeneratedFile, FixtureError> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| FixtureError::CreateDir { path: parent.to_path_buf(), source })?;
    }

    let action = if path.exists() { WriteAction::Updated } else { WriteAction::Created };
    fs::write(&path, contents).map_err(|source| FixtureError::Write { path, source })?;

    Ok(GeneratedFile { path: display_rel(rel), kind, action, bytes: contents.len() })
}

/// `/`-joined rendering of a relative path, stable across platforms.
pub fn display_rel(rel: &Path) -> String {
    rel.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamp::fixed_stamp;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn burst_pass_writes_source_and_config() {
        let tmp = TempDir::new().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let report =
            write_burst_pass(tmp.path(), &BurstLayout::default(), 1, &mut rng, &fixed_stamp())
                .unwrap();

        assert_eq!(report.round, 1);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.manifest, ManifestOutcome::Absent);

        let source = report.file(FileKind::Source).unwrap();
        assert_eq!(source.path, "src/test_file_1714548615.ts");
        assert_eq!(source.action, WriteAction::Created);
        assert!(tmp.path().join("src/test_file_1714548615.ts").is_file());

        let config: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join("data/config.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(config["settings"]["auto_commit_test"], true);
        assert_eq!(config["timestamp"], "2024-05-01T09:30:15.250000");
    }

    #[test]
    fn second_pass_marks_config_updated() {
        let tmp = TempDir::new().unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let layout = BurstLayout::default();
        write_burst_pass(tmp.path(), &layout, 1, &mut rng, &fixed_stamp()).unwrap();
        let second = write_burst_pass(tmp.path(), &layout, 2, &mut rng, &fixed_stamp()).unwrap();

        assert_eq!(second.file(FileKind::Config).unwrap().action, WriteAction::Updated);
    }

    #[test]
    fn burst_pass_updates_existing_manifest() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{\"name\":\"demo\"}").unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let report =
            write_burst_pass(tmp.path(), &BurstLayout::default(), 1, &mut rng, &fixed_stamp())
                .unwrap();

        assert_eq!(
            report.manifest,
            ManifestOutcome::Updated { script: "test-auto-commit-1714548615".into() }
        );
        let manifest: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join("package.json")).unwrap(),
        )
        .unwrap();
        assert!(manifest["scripts"]["test-auto-commit-1714548615"].is_string());
    }

    #[test]
    fn broken_manifest_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{ broken").unwrap();

        let mut rng = StdRng::seed_from_u64(4);
        let report =
            write_burst_pass(tmp.path(), &BurstLayout::default(), 1, &mut rng, &fixed_stamp())
                .unwrap();

        match &report.manifest {
            ManifestOutcome::Skipped { reason } => assert!(reason.contains("not valid JSON")),
            other => panic!("expected skipped manifest, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(tmp.path().join("package.json")).unwrap(), "{ broken");
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn manifest_path_that_is_a_directory_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("package.json")).unwrap();

        let mut rng = StdRng::seed_from_u64(6);
        let report =
            write_burst_pass(tmp.path(), &BurstLayout::default(), 1, &mut rng, &fixed_stamp())
                .unwrap();

        match &report.manifest {
            ManifestOutcome::Skipped { reason } => assert!(reason.contains("package.json")),
            other => panic!("expected skipped manifest, got {other:?}"),
        }
        assert!(tmp.path().join("package.json").is_dir());
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn custom_layout_is_respected() {
        let tmp = TempDir::new().unwrap();
        let layout = BurstLayout {
            source_dir: PathBuf::from("app/generated"),
            data_dir: PathBuf::from("fixtures"),
            manifest: PathBuf::from("web/package.json"),
        };
        let mut rng = StdRng::seed_from_u64(5);
        let report = write_burst_pass(tmp.path(), &layout, 1, &mut rng, &fixed_stamp()).unwrap();

        assert!(report.file(FileKind::Source).unwrap().path.starts_with("app/generated/"));
        assert!(tmp.path().join("fixtures/config.json").is_file());
    }

    #[test]
    fn write_fails_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("not-a-dir");
        fs::write(&root, "").unwrap();

        let mut rng = StdRng::seed_from_u64(6);
        let err = write_burst_pass(&root, &BurstLayout::default(), 1, &mut rng, &fixed_stamp())
            .unwrap_err();
        assert!(matches!(err, FixtureError::CreateDir { .. }));
    }

    #[test]
    fn write_note_creates_markdown_at_root() {
        let tmp = TempDir::new().unwrap();
        let file =
            write_note(tmp.path(), Path::new(note::DEFAULT_FILE_NAME), &fixed_stamp()).unwrap();
        assert_eq!(file.path, "test_git_functionality.md");
        assert_eq!(file.kind, FileKind::Note);
        let text = fs::read_to_string(tmp.path().join(note::DEFAULT_FILE_NAME)).unwrap();
        assert_eq!(text.len(), file.bytes);
    }

    #[test]
    fn display_rel_joins_with_slashes() {
        assert_eq!(display_rel(Path::new("src").join("a.ts").as_path()), "src/a.ts");
        assert_eq!(display_rel(Path::new("./data/config.json")), "data/config.json");
    }
}
