use std::fs;
use std::path::Path;

use serde::Deserialize;

use antenna_core::{Antenna, MatcherConfig, MemoryStore, NoteAuthor, NoteView};

/// A matching scenario: one new note, the candidate antennas, and the
/// storage state the loaders should see.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub note: NoteView,
    pub author: NoteAuthor,
    pub antennas: Vec<Antenna>,
    #[serde(default)]
    pub soft_muted_user_ids: Vec<String>,
    #[serde(default)]
    pub store: MemoryStore,
}

pub fn read_fixture(path: &Path) -> Result<Fixture, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid fixture '{}': {}", path.display(), e))
}

pub fn read_config(path: Option<&Path>) -> Result<MatcherConfig, String> {
    let Some(path) = path else {
        return Ok(MatcherConfig::default());
    };
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid config '{}': {}", path.display(), e))
}
