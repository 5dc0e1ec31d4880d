//! User-supplied regex patterns
//!
//! Patterns arrive encoded as `/pattern/flags`. They are compiled with the
//! `regex` crate, whose finite-automata engine matches in time linear in the
//! input, so a hostile pattern cannot stall the fan-out path.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// Upper bound on the compiled program size of a single user pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Error type for pattern parsing.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Pattern is not of the form /pattern/flags: {0}")]
    InvalidFormat(String),
    #[error("Unsupported regex flag: {0}")]
    UnsupportedFlag(char),
    #[error("Regex compile error: {0}")]
    Compile(#[from] regex::Error),
}

fn encoded_form() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/(.+)/([a-z]*)$").expect("valid encoded-pattern regex"))
}

/// A compiled `/pattern/flags` regex.
#[derive(Debug, Clone)]
pub struct MutePattern {
    source: String,
    regex: Regex,
}

impl MutePattern {
    /// Parse and compile an encoded pattern.
    ///
    /// Supported flags: `i` (case-insensitive), `m` (multi-line), `s` (dot
    /// matches newline). `g`, `u` and `d` do not change whether a pattern
    /// matches and are accepted. Any other flag is rejected.
    pub fn parse(encoded: &str) -> Result<Self, PatternError> {
        let caps = encoded_form()
            .captures(encoded)
            .ok_or_else(|| PatternError::InvalidFormat(encoded.to_string()))?;
        let body = &caps[1];
        let flags = &caps[2];

        let mut builder = RegexBuilder::new(body);
        builder.size_limit(PATTERN_SIZE_LIMIT);

        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'g' | 'u' | 'd' => {}
                other => return Err(PatternError::UnsupportedFlag(other)),
            }
        }

        Ok(Self {
            source: encoded.to_string(),
            regex: builder.build()?,
        })
    }

    /// The encoded pattern this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Match `text` against an encoded pattern.
///
/// Invalid patterns never match and never panic; the failure is logged.
pub fn try_match(text: &str, encoded: &str) -> bool {
    match MutePattern::parse(encoded) {
        Ok(pattern) => pattern.is_match(text),
        Err(e) => {
            log::warn!("Ignoring invalid mute pattern {encoded:?}: {e}");
            false
        }
    }
}
