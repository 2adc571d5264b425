// File postconditions a watcher-side test harness relies on after a pass.

use std::fs;
use std::path::Path;

use chrono::DateTime;
use churn_common::fixture::{self, BurstLayout};
use churn_common::stamp::Stamp;
use churn_common::types::{FileKind, ManifestOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn stamp() -> Stamp {
    Stamp::from_datetime(
        DateTime::parse_from_rfc3339("2025-01-02T03:04:05+00:00").expect("timestamp should parse"),
    )
}

#[test]
fn config_json_has_contract_keys() {
    let tmp = tempfile::tempdir().expect("tempdir should be created");
    let mut rng = StdRng::seed_from_u64(99);
    fixture::write_burst_pass(tmp.path(), &BurstLayout::default(), 1, &mut rng, &stamp())
        .expect("pass should succeed");

    let content = fs::read_to_string(tmp.path().join("data/config.json"))
        .expect("config.json should be readable");
    let config: serde_json::Value = serde_json::from_str(&content).expect("config should be JSON");

    let test_id = config["test_id"].as_u64().expect("test_id should be an integer");
    assert!((1000..=9999).contains(&test_id));
    assert_eq!(config["timestamp"], "2025-01-02T03:04:05");
    assert_eq!(config["settings"]["auto_commit_test"], true);
    let random_value =
        config["settings"]["random_value"].as_f64().expect("random_value should be a float");
    assert!((0.0..1.0).contains(&random_value));
}

#[test]
fn source_file_is_named_after_epoch_seconds() {
    let tmp = tempfile::tempdir().expect("tempdir should be created");
    let mut rng = StdRng::seed_from_u64(5);
    let report =
        fixture::write_burst_pass(tmp.path(), &BurstLayout::default(), 1, &mut rng, &stamp())
            .expect("pass should succeed");

    let source = report.file(FileKind::Source).expect("source file should be reported");
    assert_eq!(source.path, "src/test_file_1735787045.ts");
    let text = fs::read_to_string(tmp.path().join(&source.path)).expect("source should exist");
    assert!(text.contains("export interface TestInterface_"));
    assert!(text.contains("export const testFunction_"));
}

#[test]
fn manifest_gains_one_script_per_distinct_second() {
    let tmp = tempfile::tempdir().expect("tempdir should be created");
    let manifest_path = tmp.path().join("package.json");
    fs::write(&manifest_path, "{\n  \"name\": \"demo\"\n}\n").expect("manifest should be written");

    let mut rng = StdRng::seed_from_u64(8);
    let layout = BurstLayout::default();
    let first = Stamp::from_datetime(
        DateTime::parse_from_rfc3339("2025-01-02T03:04:05+00:00").expect("timestamp should parse"),
    );
    let second = Stamp::from_datetime(
        DateTime::parse_from_rfc3339("2025-01-02T03:05:05+00:00").expect("timestamp should parse"),
    );
    fixture::write_burst_pass(tmp.path(), &layout, 1, &mut rng, &first).expect("first pass");
    let report =
        fixture::write_burst_pass(tmp.path(), &layout, 2, &mut rng, &second).expect("second pass");

    assert!(matches!(report.manifest, ManifestOutcome::Updated { .. }));
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&manifest_path).expect("manifest readable"))
            .expect("manifest should stay valid JSON");
    let scripts = manifest["scripts"].as_object().expect("scripts should be an object");
    assert_eq!(scripts.len(), 2);
    assert!(scripts.keys().all(|key| key.starts_with("test-auto-commit-")));
}

#[test]
fn note_is_written_at_requested_path() {
    let tmp = tempfile::tempdir().expect("tempdir should be created");
    let file = fixture::write_note(tmp.path(), Path::new("notes/probe.md"), &stamp())
        .expect("note should be written");
    assert_eq!(file.path, "notes/probe.md");
    assert!(tmp.path().join("notes/probe.md").is_file());
}
