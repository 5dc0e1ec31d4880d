//! Core type definitions
//!
//! These are read-only snapshots handed to the matcher by the note-creation
//! pipeline. They deserialize from the camelCase JSON the rest of the
//! service speaks.

use serde::{Deserialize, Serialize};

// =============================================================================
// Visibility
// =============================================================================

/// Note visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    /// Unlisted: visible on profile and to followers' home timelines
    Home,
    Followers,
    /// Direct message to the mentioned users only
    Specified,
}

impl Visibility {
    /// Visibilities that require the antenna owner to follow the author.
    #[inline]
    pub fn requires_follow(self) -> bool {
        matches!(self, Self::Home | Self::Followers)
    }
}

// =============================================================================
// Antenna
// =============================================================================

/// Which author-identity guard an antenna applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntennaSource {
    Home,
    All,
    Users,
    List,
    Group,
    Instances,
}

/// A user-owned persistent content subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Antenna {
    pub id: String,
    /// Owner of the antenna
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub src: AntennaSource,
    #[serde(default)]
    pub user_list_id: Option<String>,
    #[serde(default)]
    pub user_group_id: Option<String>,
    /// `username@host` accounts for the `users` source
    #[serde(default)]
    pub users: Vec<String>,
    /// Hosts for the `instances` source
    #[serde(default)]
    pub instances: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<Vec<String>>,
    #[serde(default)]
    pub exclude_keywords: Vec<Vec<String>>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub with_replies: bool,
    #[serde(default)]
    pub with_file: bool,
}

// =============================================================================
// Notes
// =============================================================================

/// A file attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFile {
    pub id: String,
    /// Alt text
    #[serde(default)]
    pub comment: Option<String>,
}

/// Snapshot of a note as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: String,
    /// Author id
    pub user_id: String,
    /// Author host, `None` for local authors
    #[serde(default)]
    pub user_host: Option<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub text: Option<String>,
    /// Content warning
    #[serde(default)]
    pub cw: Option<String>,
    #[serde(default)]
    pub reply_id: Option<String>,
    #[serde(default)]
    pub renote_id: Option<String>,
    #[serde(default)]
    pub has_poll: bool,
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub files: Vec<NoteFile>,
}

impl NoteView {
    /// A renote carrying its own content. A renote without text, poll or
    /// files is a pure boost.
    pub fn is_quote(&self) -> bool {
        self.renote_id.is_some()
            && (self.text.is_some() || self.has_poll || !self.file_ids.is_empty())
    }

    /// Text searched by antenna keywords: body, content warning, alt texts.
    pub fn keyword_text(&self) -> String {
        self.join_texts(&[self.text.as_deref(), self.cw.as_deref()])
    }

    /// Text searched by word mutes: content warning, body, alt texts.
    pub fn mute_text(&self) -> String {
        self.join_texts(&[self.cw.as_deref(), self.text.as_deref()])
    }

    fn join_texts(&self, head: &[Option<&str>]) -> String {
        let mut out = head
            .iter()
            .map(|part| part.unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ");
        if !self.files.is_empty() {
            out.push(' ');
            let alts: Vec<&str> = self
                .files
                .iter()
                .map(|f| f.comment.as_deref().unwrap_or(""))
                .collect();
            out.push_str(&alts.join(" "));
        }
        out.trim().to_string()
    }
}

/// Resolved identity of a note's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteAuthor {
    pub id: String,
    pub username: String,
    /// `None` for local users
    #[serde(default)]
    pub host: Option<String>,
}

// =============================================================================
// Mute Profile
// =============================================================================

/// Hard-mute settings from a user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteProfile {
    /// OR-of-AND word groups
    #[serde(default)]
    pub muted_words: Vec<Vec<String>>,
    /// `/pattern/flags` encoded regexes
    #[serde(default)]
    pub muted_patterns: Vec<String>,
}

impl MuteProfile {
    pub fn is_empty(&self) -> bool {
        self.muted_words.is_empty() && self.muted_patterns.is_empty()
    }
}
