//! Keyword group matching
//!
//! Groups are OR-of-AND: a text matches when every keyword of at least one
//! group occurs in it as a substring.

/// Drop empty keywords, then drop groups left empty.
pub fn clean_groups<S: AsRef<str>>(groups: &[Vec<S>]) -> Vec<Vec<&str>> {
    groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|k| k.as_ref())
                .filter(|k| !k.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Check whether any cleaned group is fully contained in `text`.
///
/// An empty group list (after cleanup) never matches. Callers that treat an
/// empty list as "no constraint" must check that before calling.
pub fn matches<S: AsRef<str>>(text: &str, groups: &[Vec<S>], case_sensitive: bool) -> bool {
    let groups = clean_groups(groups);
    if groups.is_empty() {
        return false;
    }

    if case_sensitive {
        groups
            .iter()
            .any(|group| group.iter().all(|k| text.contains(k)))
    } else {
        let haystack = text.to_lowercase();
        groups
            .iter()
            .any(|group| group.iter().all(|k| haystack.contains(&k.to_lowercase())))
    }
}

/// Lower-cased cleaned groups, for callers that match many texts against the
/// same groups.
pub fn fold_groups<S: AsRef<str>>(groups: &[Vec<S>]) -> Vec<Vec<String>> {
    clean_groups(groups)
        .into_iter()
        .map(|group| group.into_iter().map(str::to_lowercase).collect())
        .collect()
}

/// Case-insensitive match against groups already passed through
/// [`fold_groups`].
pub(crate) fn matches_folded(text: &str, folded: &[Vec<String>]) -> bool {
    if folded.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    folded
        .iter()
        .any(|group| group.iter().all(|k| haystack.contains(k.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|g| g.iter().map(|k| k.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_and_within_group() {
        let g = groups(&[&["cats", "cute"]]);
        assert!(matches("I love cute cats today", &g, false));
        assert!(!matches("I love cats", &g, false));
    }

    #[test]
    fn test_or_across_groups() {
        let g = groups(&[&["cats", "cute"], &["dogs"]]);
        assert!(matches("I love dogs", &g, false));
        assert!(matches("cute cats", &g, false));
        assert!(!matches("I love birds", &g, false));
    }

    #[test]
    fn test_case_sensitivity() {
        let g = groups(&[&["Apple"]]);
        assert!(matches("apple and banana", &g, false));
        assert!(!matches("apple and banana", &g, true));
        assert!(matches("Apple and banana", &g, true));

        let g = groups(&[&["Apple", "Banana"]]);
        assert!(matches("apple and banana", &g, false));
        assert!(!matches("apple and cinnamon", &g, true));
        assert!(!matches("apple and cinnamon", &g, false));
    }

    #[test]
    fn test_cleanup() {
        let g = groups(&[&["", ""], &["", "dogs"], &[]]);
        let cleaned = clean_groups(&g);
        assert_eq!(cleaned, vec![vec!["dogs"]]);

        assert!(matches("dogs", &g, false));
        assert!(!matches("cats", &g, false));
    }

    #[test]
    fn test_cleanup_idempotent() {
        let g = groups(&[&["", "a"], &[""], &["b", "c"]]);
        let cleaned: Vec<Vec<String>> = clean_groups(&g)
            .into_iter()
            .map(|grp| grp.into_iter().map(str::to_string).collect())
            .collect();
        for text in ["a", "b c", "c", "", "xyz"] {
            assert_eq!(matches(text, &g, false), matches(text, &cleaned, false));
        }
    }

    #[test]
    fn test_empty_groups_never_match() {
        let empty: Vec<Vec<String>> = Vec::new();
        assert!(!matches("anything", &empty, false));
        assert!(!matches("", &groups(&[&[""]]), true));
    }

    #[test]
    fn test_folded() {
        let folded = fold_groups(&groups(&[&["FOO", ""], &[""]]));
        assert_eq!(folded, vec![vec!["foo".to_string()]]);
        assert!(matches_folded("some Foo here", &folded));
        assert!(!matches_folded("bar", &folded));
        assert!(!matches_folded("foo", &[]));
    }
}
