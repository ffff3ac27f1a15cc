//! # Grammar fixture loader
//!
//! Fixtures are `.grammar` files under `tests/fixtures/{valid,invalid}`.
//! Expectations live in the fixture itself, as `#` comment lines the
//! grammar language skips:
//!
//! ```text
//! # rules: expr term
//! # fails-at: 2.7
//! # ctx: all rule_seq rule_def
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single grammar fixture.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

impl Fixture {
    /// The value of the `# key: value` line, if present.
    pub fn expectation(&self, key: &str) -> Option<&str> {
        let prefix = format!("# {key}:");
        self.text
            .lines()
            .find_map(|line| line.strip_prefix(&prefix))
            .map(str::trim)
    }

    /// The expectation split on whitespace.
    pub fn expected_words(&self, key: &str) -> Vec<&str> {
        self.expectation(key)
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Loads every `.grammar` fixture under `fixtures/<kind>`, sorted by name.
pub fn load_fixtures(kind: &str) -> Vec<Fixture> {
    let dir = fixtures_dir().join(kind);
    let mut fixtures: Vec<Fixture> = WalkDir::new(&dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().map_or(false, |ext| ext == "grammar"))
        .map(|entry| {
            let path = entry.path().to_path_buf();
            let text = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("failed to read fixture '{}': {e}", path.display()));
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Fixture { name, path, text }
        })
        .collect();
    fixtures.sort_by(|a, b| a.name.cmp(&b.name));
    assert!(!fixtures.is_empty(), "no fixtures under {}", dir.display());
    fixtures
}
