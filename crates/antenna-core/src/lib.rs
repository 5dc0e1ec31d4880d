//! Antenna Core Library
//!
//! This crate decides which antennas (saved-search subscriptions) a newly
//! published note satisfies, and whether a note is suppressed by a user's
//! hard word-mute rules.
//!
//! # Architecture
//!
//! Matching is a pure decision over supplied snapshots of note, antenna and
//! profile state. The only shared mutable structure is the relationship
//! cache, a short-TTL read-through cache in front of loaders owned by the
//! storage layer.
//!
//! # Modules
//!
//! - `keywords`: AND-within-group / OR-across-groups keyword matching
//! - `pattern`: `/pattern/flags` user regexes on a linear-time engine
//! - `word_mute`: hard word-mute evaluation with depth-1 ancestry
//! - `acct`: `username@host` parsing and canonicalization
//! - `cache`: TTL relationship cache and loader traits
//! - `matcher`: the antenna guard pipeline and batch fan-out
//! - `memory`: in-memory loaders for fixtures and tests
//! - `config`: matcher configuration
//! - `types`: shared snapshot types

pub mod acct;
pub mod cache;
pub mod config;
pub mod keywords;
pub mod matcher;
pub mod memory;
pub mod pattern;
pub mod types;
pub mod word_mute;

// Re-export commonly used types
pub use acct::{full_account, normalize_host, Acct};
pub use cache::{LoadError, NoteLoader, RelationshipCache, RelationshipKind, RelationshipLoader};
pub use config::MatcherConfig;
pub use keywords::{clean_groups, matches};
pub use matcher::{AntennaMatcher, MatchError, ResolvedNote};
pub use memory::MemoryStore;
pub use pattern::{try_match, MutePattern, PatternError};
pub use types::{Antenna, AntennaSource, MuteProfile, NoteAuthor, NoteFile, NoteView, Visibility};
pub use word_mute::{is_hard_muted, MuteRules};
