//! In-memory loaders
//!
//! A [`MemoryStore`] answers relationship and note lookups from plain maps.
//! It deserializes from JSON so fixtures can describe a whole scenario.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::{LoadError, NoteLoader, RelationshipLoader};
use crate::types::{MuteProfile, NoteView};

/// Relationship and note data held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryStore {
    /// blocker id -> blocked user ids
    pub blockings: HashMap<String, Vec<String>>,
    /// follower id -> followee ids
    pub followings: HashMap<String, Vec<String>>,
    /// user id -> mute profile
    pub profiles: HashMap<String, MuteProfile>,
    /// note id -> note
    pub notes: HashMap<String, NoteView>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&mut self, blocker: &str, blockee: &str) -> &mut Self {
        self.blockings
            .entry(blocker.to_string())
            .or_default()
            .push(blockee.to_string());
        self
    }

    pub fn follow(&mut self, follower: &str, followee: &str) -> &mut Self {
        self.followings
            .entry(follower.to_string())
            .or_default()
            .push(followee.to_string());
        self
    }

    pub fn set_profile(&mut self, user_id: &str, profile: MuteProfile) -> &mut Self {
        self.profiles.insert(user_id.to_string(), profile);
        self
    }

    pub fn add_note(&mut self, note: NoteView) -> &mut Self {
        self.notes.insert(note.id.clone(), note);
        self
    }
}

#[async_trait]
impl RelationshipLoader for MemoryStore {
    async fn blocked_user_ids(&self, user_id: &str) -> Result<Vec<String>, LoadError> {
        Ok(self.blockings.get(user_id).cloned().unwrap_or_default())
    }

    async fn followee_ids(&self, user_id: &str) -> Result<Vec<String>, LoadError> {
        Ok(self.followings.get(user_id).cloned().unwrap_or_default())
    }

    async fn mute_profile(&self, user_id: &str) -> Result<Option<MuteProfile>, LoadError> {
        Ok(self.profiles.get(user_id).cloned())
    }
}

#[async_trait]
impl NoteLoader for MemoryStore {
    async fn find_note(&self, note_id: &str) -> Result<Option<NoteView>, LoadError> {
        Ok(self.notes.get(note_id).cloned())
    }
}
