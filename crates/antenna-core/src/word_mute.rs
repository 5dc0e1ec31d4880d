//! Hard word-mute evaluation
//!
//! A note is hard-muted when its aggregated text (content warning, body,
//! attachment alt texts) contains every word of some muted word group, or
//! matches some muted pattern. The check also runs on the note's reply
//! parent and, for quotes, the quoted note. Ancestry stops at depth 1.

use crate::keywords::{fold_groups, matches_folded};
use crate::pattern::MutePattern;
use crate::types::{MuteProfile, NoteView};

/// Mute rules compiled once and reused across notes.
#[derive(Debug, Clone, Default)]
pub struct MuteRules {
    words: Vec<Vec<String>>,
    patterns: Vec<MutePattern>,
}

impl MuteRules {
    /// Compile word groups and patterns. Invalid patterns are dropped.
    pub fn compile<S: AsRef<str>>(muted_words: &[Vec<S>], muted_patterns: &[S]) -> Self {
        let patterns = muted_patterns
            .iter()
            .filter_map(|encoded| match MutePattern::parse(encoded.as_ref()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    // Input is validated upstream; this should not happen.
                    log::warn!("Found invalid regex in word mutes {:?}: {e}", encoded.as_ref());
                    None
                }
            })
            .collect();

        Self {
            words: fold_groups(muted_words),
            patterns,
        }
    }

    pub fn from_profile(profile: &MuteProfile) -> Self {
        Self::compile(&profile.muted_words, &profile.muted_patterns)
    }

    /// No usable word group or pattern.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.patterns.is_empty()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Check a single note, ignoring its ancestry.
    pub fn matches_note(&self, note: &NoteView) -> bool {
        let text = note.mute_text();
        if text.is_empty() {
            return false;
        }

        if matches_folded(&text, &self.words) {
            return true;
        }

        self.patterns.iter().any(|p| p.is_match(&text))
    }

    /// Check a note and its depth-1 ancestry.
    ///
    /// `quote` is only consulted when `note` is a quote; a pure boost does
    /// not inherit its target's mute state.
    pub fn is_hard_muted(
        &self,
        note: &NoteView,
        reply: Option<&NoteView>,
        quote: Option<&NoteView>,
    ) -> bool {
        if self.is_empty() {
            return false;
        }

        if self.matches_note(note) {
            return true;
        }

        if reply.is_some_and(|parent| self.matches_note(parent)) {
            return true;
        }

        note.is_quote() && quote.is_some_and(|parent| self.matches_note(parent))
    }
}

/// Evaluate uncompiled mute settings against a note and its ancestry.
///
/// Word comparison is always case-insensitive.
pub fn is_hard_muted<S: AsRef<str>>(
    note: &NoteView,
    reply: Option<&NoteView>,
    quote: Option<&NoteView>,
    muted_words: &[Vec<S>],
    muted_patterns: &[S],
) -> bool {
    MuteRules::compile(muted_words, muted_patterns).is_hard_muted(note, reply, quote)
}
