//! Relationship Cache
//!
//! Short-TTL, per-user caches for the relationship facts the matcher cannot
//! be handed synchronously: who a user blocks, who a user follows, and the
//! user's hard-mute rules. Misses and expired entries are filled through an
//! injected [`RelationshipLoader`].
//!
//! Concurrent misses on the same key may load twice; the last write wins.
//! Entries may be stale for up to one TTL after the underlying data changes.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::config::MatcherConfig;
use crate::types::{MuteProfile, NoteView};
use crate::word_mute::MuteRules;

// =============================================================================
// Loaders
// =============================================================================

/// Error type for loader calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Loader timed out after {0:?}")]
    Timeout(Duration),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Relationship lookups owned by the storage layer.
#[async_trait]
pub trait RelationshipLoader: Send + Sync {
    /// Ids of the users `user_id` has blocked.
    async fn blocked_user_ids(&self, user_id: &str) -> Result<Vec<String>, LoadError>;

    /// Ids of the users `user_id` follows.
    async fn followee_ids(&self, user_id: &str) -> Result<Vec<String>, LoadError>;

    /// Hard-mute settings of `user_id`, `None` if the profile does not exist.
    async fn mute_profile(&self, user_id: &str) -> Result<Option<MuteProfile>, LoadError>;
}

/// Note lookups owned by the storage layer.
#[async_trait]
pub trait NoteLoader: Send + Sync {
    async fn find_note(&self, note_id: &str) -> Result<Option<NoteView>, LoadError>;
}

/// Run a loader future under `timeout`.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, LoadError>
where
    F: Future<Output = Result<T, LoadError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(LoadError::Timeout(timeout)),
    }
}

// =============================================================================
// TTL Map
// =============================================================================

struct Entry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

/// String-keyed map whose entries expire `ttl` after insertion.
struct TtlMap<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
    last_sweep: Mutex<Instant>,
}

impl<V> TtlMap<V> {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            log::warn!("relationship cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            log::warn!("relationship cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn is_expired(&self, entry: &Entry<V>) -> bool {
        entry.stored_at.elapsed() >= self.ttl
    }

    /// Live entry for `key`. An expired entry is removed on the way out.
    fn get(&self, key: &str) -> Option<Arc<V>> {
        {
            let entries = self.read();
            let entry = entries.get(key)?;
            if !self.is_expired(entry) {
                return Some(Arc::clone(&entry.value));
            }
        }

        let mut entries = self.write();
        // Another task may have refilled the key between the two locks.
        let entry = entries.get(key)?;
        if !self.is_expired(entry) {
            return Some(Arc::clone(&entry.value));
        }
        entries.remove(key);
        None
    }

    /// Store `value` under `key`. At most once per TTL, expired entries of
    /// other keys are swept as well.
    fn insert(&self, key: &str, value: Arc<V>) {
        let mut entries = self.write();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );

        let mut last_sweep = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
        if last_sweep.elapsed() >= self.ttl {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            *last_sweep = Instant::now();
        }
    }

    fn remove(&self, key: &str) {
        self.write().remove(key);
    }

    fn clear(&self) {
        self.write().clear();
    }

    fn purge_expired(&self) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}

// =============================================================================
// Relationship Cache
// =============================================================================

/// Which relationship fact to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// Users blocked by the key user
    Blocking,
    /// Users followed by the key user
    Following,
    /// The key user's hard-mute rules
    MuteProfile,
}

/// A cached relationship fact.
#[derive(Debug, Clone)]
pub enum Relationship {
    Blocking(Arc<HashSet<String>>),
    Following(Arc<HashSet<String>>),
    /// `None` when the user has no profile
    MuteProfile(Option<Arc<MuteRules>>),
}

/// Read-through TTL cache over a [`RelationshipLoader`].
pub struct RelationshipCache {
    loader: Arc<dyn RelationshipLoader>,
    timeout: Duration,
    blocking: TtlMap<HashSet<String>>,
    following: TtlMap<HashSet<String>>,
    mutes: TtlMap<MuteRules>,
}

impl RelationshipCache {
    /// Create a cache whose entries live for `ttl`. Every loader call is
    /// bounded by `timeout`.
    pub fn new(loader: Arc<dyn RelationshipLoader>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            loader,
            timeout,
            blocking: TtlMap::new(ttl),
            following: TtlMap::new(ttl),
            mutes: TtlMap::new(ttl),
        }
    }

    pub fn from_config(loader: Arc<dyn RelationshipLoader>, config: &MatcherConfig) -> Self {
        Self::new(loader, config.cache_ttl(), config.loader_timeout())
    }

    /// Users blocked by `user_id`.
    pub async fn blocking(&self, user_id: &str) -> Result<Arc<HashSet<String>>, LoadError> {
        if let Some(ids) = self.blocking.get(user_id) {
            return Ok(ids);
        }

        log::debug!("blocking cache miss for {user_id}");
        let ids = with_timeout(self.timeout, self.loader.blocked_user_ids(user_id)).await?;
        let ids: Arc<HashSet<String>> = Arc::new(ids.into_iter().collect());
        self.blocking.insert(user_id, Arc::clone(&ids));
        Ok(ids)
    }

    /// Users followed by `user_id`.
    pub async fn following(&self, user_id: &str) -> Result<Arc<HashSet<String>>, LoadError> {
        if let Some(ids) = self.following.get(user_id) {
            return Ok(ids);
        }

        log::debug!("following cache miss for {user_id}");
        let ids = with_timeout(self.timeout, self.loader.followee_ids(user_id)).await?;
        let ids: Arc<HashSet<String>> = Arc::new(ids.into_iter().collect());
        self.following.insert(user_id, Arc::clone(&ids));
        Ok(ids)
    }

    /// Compiled hard-mute rules of `user_id`. A missing profile is returned
    /// as `None` and not cached.
    pub async fn mute_rules(&self, user_id: &str) -> Result<Option<Arc<MuteRules>>, LoadError> {
        if let Some(rules) = self.mutes.get(user_id) {
            return Ok(Some(rules));
        }

        log::debug!("mute profile cache miss for {user_id}");
        let Some(profile) = with_timeout(self.timeout, self.loader.mute_profile(user_id)).await?
        else {
            return Ok(None);
        };
        let rules = if profile.is_empty() {
            Arc::new(MuteRules::default())
        } else {
            Arc::new(MuteRules::from_profile(&profile))
        };
        self.mutes.insert(user_id, Arc::clone(&rules));
        Ok(Some(rules))
    }

    /// Look up any relationship kind.
    pub async fn fetch(&self, user_id: &str, kind: RelationshipKind) -> Result<Relationship, LoadError> {
        Ok(match kind {
            RelationshipKind::Blocking => Relationship::Blocking(self.blocking(user_id).await?),
            RelationshipKind::Following => Relationship::Following(self.following(user_id).await?),
            RelationshipKind::MuteProfile => Relationship::MuteProfile(self.mute_rules(user_id).await?),
        })
    }

    /// Drop one cached entry so the next lookup reloads it.
    pub fn invalidate(&self, kind: RelationshipKind, user_id: &str) {
        log::debug!("invalidating {kind:?} cache for {user_id}");
        match kind {
            RelationshipKind::Blocking => self.blocking.remove(user_id),
            RelationshipKind::Following => self.following.remove(user_id),
            RelationshipKind::MuteProfile => self.mutes.remove(user_id),
        }
    }

    pub fn clear(&self) {
        self.blocking.clear();
        self.following.clear();
        self.mutes.clear();
    }

    /// Remove expired entries. Returns how many were removed.
    ///
    /// Lookups and inserts already drop expired entries as they go; this
    /// sweeps everything at once.
    pub fn purge_expired(&self) -> usize {
        self.blocking.purge_expired() + self.following.purge_expired() + self.mutes.purge_expired()
    }

    /// Number of stored entries, expired ones not yet swept included.
    pub fn len(&self) -> usize {
        self.blocking.len() + self.following.len() + self.mutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
