// Adds a throwaway script entry to an existing `package.json`.

use serde_json::{Map, Value};

use super::FixtureError;
use crate::stamp::Stamp;

pub const DEFAULT_FILE_NAME: &str = "package.json";
pub const SCRIPT_PREFIX: &str = "test-auto-commit-";

/// `test-auto-commit-<unix-secs>`
pub fn script_name(stamp: &Stamp) -> String {
    format!("{SCRIPT_PREFIX}{}", stamp.unix_secs())
}

/// Insert the stamped script into `manifest["scripts"]`, creating the
/// `scripts` object when it is missing. Returns the script name.
///
/// Existing keys keep their order; the new entry is appended (or replaces
/// an entry written earlier in the same second).
pub fn add_test_script(manifest: &mut Value, stamp: &Stamp) -> Result<String, FixtureError> {
    let root = manifest.as_object_mut().ok_or(FixtureError::ManifestNotObject)?;
    let scripts = root
        .entry("scripts")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or(FixtureError::ScriptsNotObject)?;

    let name = script_name(stamp);
    let command = format!("echo \"Test script added at {}\"", stamp.iso());
    scripts.insert(name.clone(), Value::String(command));
    Ok(name)
}

/// Parse, patch and re-render manifest text. A trailing newline in the
/// input is kept so editors and formatters don't see a spurious change.
pub fn patch_text(text: &str, stamp: &Stamp) -> Result<(String, String), FixtureError> {
    let mut manifest: Value =
        serde_json::from_str(text).map_err(|source| FixtureError::ManifestParse { source })?;
    let name = add_test_script(&mut manifest, stamp)?;
    let mut rendered = serde_json::to_string_pretty(&manifest)
        .map_err(|source| FixtureError::Serialize { what: "manifest", source })?;
    if text.ends_with('\n') {
        rendered.push('\n');
    }
    Ok((name, rendered))
}
