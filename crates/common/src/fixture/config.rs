// `data/config.json` payload.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::stamp::Stamp;

pub const FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFixture {
    pub test_id: u32,
    pub timestamp: String,
    pub settings: ConfigSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSettings {
    /// Always `true`; lets a reviewer grep commits for fixture output.
    pub auto_commit_test: bool,
    /// Uniform in `[0, 1)`, so every pass changes the file's bytes.
    pub random_value: f64,
}

impl ConfigFixture {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, stamp: &Stamp) -> Self {
        Self {
            test_id: rng.gen_range(1000..=9999),
            timestamp: stamp.iso(),
            settings: ConfigSettings { auto_commit_test: true, random_value: rng.gen::<f64>() },
        }
    }

    /// Two-space indented JSON, no trailing newline.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
