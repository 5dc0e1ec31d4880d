//! Account identifiers
//!
//! Parses `username@host` strings and canonicalizes them for comparison.
//! Hosts are compared in their IDNA (Punycode) ASCII form, lower-cased.
//!
//! # Examples
//!
//! ```
//! use antenna_core::acct::{full_account, Acct};
//!
//! let acct: Acct = "@Alice@Example.COM".parse().unwrap();
//! assert_eq!(acct.username, "Alice");
//! assert_eq!(full_account(&acct.username, acct.host.as_deref(), "local.test"), "alice@example.com");
//! ```

use std::fmt;
use std::str::FromStr;

/// Error type for account parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcctError {
    #[error("Account has an empty username")]
    EmptyUsername,
}

/// A `username@host` account. `host` is `None` for local accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Acct {
    pub username: String,
    pub host: Option<String>,
}

impl FromStr for Acct {
    type Err = AcctError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let value = value.strip_prefix('@').unwrap_or(value);
        let mut split = value.splitn(2, '@');

        let username = split.next().unwrap_or_default();
        if username.is_empty() {
            return Err(AcctError::EmptyUsername);
        }

        let host = split.next().filter(|h| !h.is_empty()).map(str::to_string);

        Ok(Self {
            username: username.to_string(),
            host,
        })
    }
}

impl fmt::Display for Acct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) => write!(f, "{}@{}", self.username, host),
            None => write!(f, "{}", self.username),
        }
    }
}

impl Acct {
    /// Canonical `username@host` form, see [`full_account`].
    pub fn canonical(&self, local_host: &str) -> String {
        full_account(&self.username, self.host.as_deref(), local_host)
    }
}

/// Convert a host to its lower-cased ASCII (Punycode) form.
///
/// Hosts IDNA rejects fall back to plain lower-casing.
pub fn normalize_host(host: &str) -> String {
    match idna::domain_to_ascii(host) {
        Ok(ascii) => ascii.to_ascii_lowercase(),
        Err(e) => {
            log::debug!("IDNA conversion failed for {host:?}: {e:?}");
            host.to_lowercase()
        }
    }
}

/// Lower-cased `username@host` with a normalized host. Local accounts get
/// `local_host`.
pub fn full_account(username: &str, host: Option<&str>, local_host: &str) -> String {
    let host = normalize_host(host.unwrap_or(local_host));
    format!("{}@{}", username.to_lowercase(), host)
}

/// Whether `host` refers to the local instance.
pub fn is_self_host(host: Option<&str>, local_host: &str) -> bool {
    match host {
        Some(host) => normalize_host(host) == normalize_host(local_host),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let remote = Acct {
            username: "firefish".to_string(),
            host: Some("example.com".to_string()),
        };
        let local = Acct {
            username: "MisakaMikoto".to_string(),
            host: None,
        };

        assert_eq!("@firefish@example.com".parse::<Acct>().unwrap(), remote);
        assert_eq!("firefish@example.com".parse::<Acct>().unwrap(), remote);
        assert_eq!("@MisakaMikoto".parse::<Acct>().unwrap(), local);
        assert_eq!("MisakaMikoto".parse::<Acct>().unwrap(), local);
        assert_eq!("MisakaMikoto@".parse::<Acct>().unwrap(), local);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!("".parse::<Acct>(), Err(AcctError::EmptyUsername));
        assert_eq!("@".parse::<Acct>(), Err(AcctError::EmptyUsername));
        assert_eq!("@@example.com".parse::<Acct>(), Err(AcctError::EmptyUsername));
    }

    #[test]
    fn test_display() {
        let remote: Acct = "firefish@example.com".parse().unwrap();
        let local: Acct = "MisakaMikoto".parse().unwrap();
        assert_eq!(remote.to_string(), "firefish@example.com");
        assert_eq!(local.to_string(), "MisakaMikoto");
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Example.COM"), "example.com");
        assert_eq!(normalize_host("bücher.example"), "xn--bcher-kva.example");
        assert_eq!(normalize_host("xn--bcher-kva.example"), "xn--bcher-kva.example");
    }

    #[test]
    fn test_full_account() {
        assert_eq!(
            full_account("Alice", Some("BÜCHER.example"), "local.test"),
            "alice@xn--bcher-kva.example"
        );
        assert_eq!(full_account("Bob", None, "Local.Test"), "bob@local.test");

        let acct: Acct = "@alice@bücher.example".parse().unwrap();
        assert_eq!(acct.canonical("local.test"), "alice@xn--bcher-kva.example");
    }

    #[test]
    fn test_is_self_host() {
        assert!(is_self_host(None, "local.test"));
        assert!(is_self_host(Some("LOCAL.test"), "local.test"));
        assert!(!is_self_host(Some("example.com"), "local.test"));
    }
}
