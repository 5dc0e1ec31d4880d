//! Antenna Matching Engine
//!
//! This is the fan-out hot path: every new note is checked against every
//! candidate antenna. Each check is an ordered guard pipeline; the first
//! failing guard rejects the note for that antenna.
//!
//! Guard order:
//! 0. soft-muted owner
//! 1. visibility (direct messages never match)
//! 2. file presence
//! 3. reply policy
//! 4. source criteria (users / instances)
//! 5. include keywords
//! 6. exclude keywords
//! 7. author blocks owner
//! 8. owner follows author (home / followers visibility)
//! 9. owner's hard word mutes

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::acct::{full_account, is_self_host, normalize_host, Acct};
use crate::cache::{with_timeout, NoteLoader, RelationshipCache, RelationshipLoader};
use crate::config::MatcherConfig;
use crate::keywords;
use crate::types::{Antenna, AntennaSource, NoteAuthor, NoteView, Visibility};

/// Error type for a single antenna evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("User profile not found: {0}")]
    ProfileNotFound(String),
}

// =============================================================================
// Resolved Note
// =============================================================================

/// A new note with everything the guards need, shared by every antenna
/// evaluated for it.
#[derive(Debug, Clone)]
pub struct ResolvedNote {
    pub note: NoteView,
    pub author: NoteAuthor,
    /// The note being replied to
    pub reply: Option<NoteView>,
    /// The quoted note; ignored unless `note` is a quote
    pub quote: Option<NoteView>,
    /// Users who soft-muted the author
    pub soft_muted_user_ids: HashSet<String>,
}

impl ResolvedNote {
    pub fn new(note: NoteView, author: NoteAuthor) -> Self {
        Self {
            note,
            author,
            reply: None,
            quote: None,
            soft_muted_user_ids: HashSet::new(),
        }
    }

    pub fn with_reply(mut self, reply: NoteView) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_quote(mut self, quote: NoteView) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_soft_muted<I, S>(mut self, user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.soft_muted_user_ids
            .extend(user_ids.into_iter().map(Into::into));
        self
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Decides which antennas a note satisfies.
pub struct AntennaMatcher {
    config: MatcherConfig,
    cache: Arc<RelationshipCache>,
    notes: Arc<dyn NoteLoader>,
}

impl AntennaMatcher {
    /// Create a matcher with its own relationship cache.
    pub fn new(
        config: MatcherConfig,
        relationships: Arc<dyn RelationshipLoader>,
        notes: Arc<dyn NoteLoader>,
    ) -> Self {
        let cache = Arc::new(RelationshipCache::from_config(relationships, &config));
        Self::with_cache(config, cache, notes)
    }

    /// Create a matcher sharing an existing relationship cache.
    pub fn with_cache(
        config: MatcherConfig,
        cache: Arc<RelationshipCache>,
        notes: Arc<dyn NoteLoader>,
    ) -> Self {
        Self { config, cache, notes }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// The relationship cache, for invalidation by the owning system.
    pub fn cache(&self) -> &RelationshipCache {
        &self.cache
    }

    /// Load the reply parent and quoted note of `note`.
    ///
    /// Missing or failed lookups are logged and left empty.
    pub async fn resolve<I, S>(&self, note: NoteView, author: NoteAuthor, soft_muted_user_ids: I) -> ResolvedNote
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reply_id = note.reply_id.as_deref();
        let quote_id = if note.is_quote() { note.renote_id.as_deref() } else { None };

        let (reply, quote) = futures::join!(
            self.load_parent(reply_id, "reply"),
            self.load_parent(quote_id, "quote")
        );

        ResolvedNote {
            reply,
            quote,
            ..ResolvedNote::new(note, author)
        }
        .with_soft_muted(soft_muted_user_ids)
    }

    async fn load_parent(&self, note_id: Option<&str>, relation: &str) -> Option<NoteView> {
        let note_id = note_id?;
        match with_timeout(self.config.loader_timeout(), self.notes.find_note(note_id)).await {
            Ok(Some(note)) => Some(note),
            Ok(None) => {
                log::warn!("nonexistent {relation} id: {note_id}");
                None
            }
            Err(e) => {
                log::warn!("Failed to load {relation} {note_id}: {e}");
                None
            }
        }
    }

    /// Check one antenna against a note.
    ///
    /// Loader failures make the guard that needed them fail closed. Only a
    /// missing owner profile is an error.
    pub async fn evaluate(&self, antenna: &Antenna, target: &ResolvedNote) -> Result<bool, MatchError> {
        let note = &target.note;

        // G0: Owner soft-muted the author
        if target.soft_muted_user_ids.contains(&antenna.user_id) {
            return Ok(rejected(antenna, note, "soft mute"));
        }

        // G1: Direct messages
        if note.visibility == Visibility::Specified {
            return Ok(rejected(antenna, note, "visibility"));
        }

        // G2: File presence
        if antenna.with_file && note.file_ids.is_empty() {
            return Ok(rejected(antenna, note, "file"));
        }

        // G3: Replies
        if !antenna.with_replies && note.reply_id.is_some() {
            return Ok(rejected(antenna, note, "reply"));
        }

        // G4: Source criteria
        if !self.check_source(antenna, note, &target.author) {
            return Ok(rejected(antenna, note, "source"));
        }

        // G5: Include keywords
        if !check_keywords(antenna, note) {
            return Ok(rejected(antenna, note, "keywords"));
        }

        // G6: Exclude keywords
        if has_excluded_keyword(antenna, note) {
            return Ok(rejected(antenna, note, "exclude keywords"));
        }

        // G7: Author blocks the owner
        match self.cache.blocking(&note.user_id).await {
            Ok(blocked) if blocked.contains(&antenna.user_id) => {
                return Ok(rejected(antenna, note, "blocking"));
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Blocking lookup for {} failed: {e}", note.user_id);
                return Ok(rejected(antenna, note, "blocking lookup"));
            }
        }

        // G8: Owner follows the author
        if note.visibility.requires_follow() {
            match self.cache.following(&antenna.user_id).await {
                Ok(following) if following.contains(&note.user_id) => {}
                Ok(_) => return Ok(rejected(antenna, note, "following")),
                Err(e) => {
                    log::warn!("Following lookup for {} failed: {e}", antenna.user_id);
                    return Ok(rejected(antenna, note, "following lookup"));
                }
            }
        }

        // G9: Owner's hard mutes
        if antenna.user_id != note.user_id {
            match self.cache.mute_rules(&antenna.user_id).await {
                Ok(Some(rules)) => {
                    if rules.is_hard_muted(note, target.reply.as_ref(), target.quote.as_ref()) {
                        return Ok(rejected(antenna, note, "hard mute"));
                    }
                }
                Ok(None) => return Err(MatchError::ProfileNotFound(antenna.user_id.clone())),
                Err(e) => {
                    log::warn!("Mute profile lookup for {} failed: {e}", antenna.user_id);
                    return Ok(rejected(antenna, note, "mute lookup"));
                }
            }
        }

        Ok(true)
    }

    /// Check every antenna against a note, concurrently.
    ///
    /// Returns the matching antennas in input order. An antenna whose
    /// evaluation fails is logged and treated as not matching.
    pub async fn match_all<'a>(&self, target: &ResolvedNote, antennas: &'a [Antenna]) -> Vec<&'a Antenna> {
        let results: Vec<(&'a Antenna, bool)> = stream::iter(antennas)
            .map(|antenna| async move {
                match self.evaluate(antenna, target).await {
                    Ok(hit) => (antenna, hit),
                    Err(e) => {
                        log::warn!(
                            "Failed to check if note {} should be added to antenna {}: {e}",
                            target.note.id,
                            antenna.id
                        );
                        (antenna, false)
                    }
                }
            })
            .buffered(self.config.concurrency())
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(antenna, hit)| hit.then_some(antenna))
            .collect()
    }

    fn check_source(&self, antenna: &Antenna, note: &NoteView, author: &NoteAuthor) -> bool {
        let local_host = self.config.local_host.as_str();

        match antenna.src {
            AntennaSource::Users => {
                let author_acct = full_account(&author.username, author.host.as_deref(), local_host);
                antenna
                    .users
                    .iter()
                    .filter_map(|raw| match raw.parse::<Acct>() {
                        Ok(acct) => Some(acct),
                        Err(e) => {
                            log::warn!("Antenna {} has an invalid account {raw:?}: {e}", antenna.id);
                            None
                        }
                    })
                    .any(|acct| acct.canonical(local_host) == author_acct)
            }
            AntennaSource::Instances => {
                let author_host = match note.user_host.as_deref() {
                    Some(host) if !is_self_host(Some(host), local_host) => normalize_host(host),
                    _ => normalize_host(local_host),
                };
                antenna
                    .instances
                    .iter()
                    .filter(|host| !host.is_empty())
                    .any(|host| normalize_host(host) == author_host)
            }
            // List and group membership is resolved before an antenna
            // becomes a candidate.
            AntennaSource::Home | AntennaSource::All | AntennaSource::List | AntennaSource::Group => true,
        }
    }
}

fn check_keywords(antenna: &Antenna, note: &NoteView) -> bool {
    if antenna.keywords.is_empty() {
        return true;
    }
    if note.text.is_none() {
        return false;
    }
    keywords::matches(&note.keyword_text(), &antenna.keywords, antenna.case_sensitive)
}

/// Exclusions are checked against the body only, not the content warning
/// or alt texts.
fn has_excluded_keyword(antenna: &Antenna, note: &NoteView) -> bool {
    if antenna.exclude_keywords.is_empty() {
        return false;
    }
    match note.text.as_deref() {
        Some(text) => keywords::matches(text, &antenna.exclude_keywords, antenna.case_sensitive),
        None => true,
    }
}

#[inline]
fn rejected(antenna: &Antenna, note: &NoteView, guard: &str) -> bool {
    log::trace!("note {} rejected by antenna {}: {guard}", note.id, antenna.id);
    false
}
