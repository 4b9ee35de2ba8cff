//! Grow-only grant sets.
//!
//! A [`GrantSet`] holds role or permission tokens. The public API only ever
//! adds entries: once a token is granted during the generation phase it
//! stays granted until the profile is discarded.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Deduplicated set of non-empty grant tokens.
///
/// Tokens are opaque strings; Portcullis never interprets them. Empty tokens
/// are rejected silently so the set never contains one.
///
/// # Example
///
/// ```
/// use portcullis_core::GrantSet;
///
/// let mut roles = GrantSet::new();
/// assert!(roles.insert("admin"));
/// assert!(!roles.insert("admin"));
/// assert!(!roles.insert(""));
/// assert_eq!(roles.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GrantSet(BTreeSet<String>);

impl GrantSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token.
    ///
    /// Returns `true` if the token was not present before. Empty tokens are
    /// ignored and return `false`.
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if token.is_empty() {
            return false;
        }
        self.0.insert(token)
    }

    /// Adds every token from an iterator, returning how many were new.
    pub fn extend<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tokens.into_iter().map(|t| usize::from(self.insert(t))).sum()
    }

    /// Returns `true` if the token is granted.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing has been granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tokens in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a GrantSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for GrantSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

// Routed through `insert` so a stored empty token is dropped on load.
impl<'de> Deserialize<'de> for GrantSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(|tokens| tokens.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let mut set = GrantSet::new();
        assert!(set.insert("read"));
        assert!(!set.insert("read"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut set = GrantSet::new();
        assert!(!set.insert(""));
        assert!(set.is_empty());
    }

    #[test]
    fn test_whitespace_token_kept_verbatim() {
        let mut set = GrantSet::new();
        assert!(set.insert(" write"));
        assert!(set.contains(" write"));
        assert!(!set.contains("write"));
    }

    #[test]
    fn test_extend_counts_new_tokens() {
        let mut set = GrantSet::new();
        set.insert("a");
        assert_eq!(set.extend(["a", "b", "", "c", "b"]), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_serializes_as_array() {
        let set: GrantSet = ["editor", "admin"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["admin","editor"]"#);

        let parsed: GrantSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_deserialize_drops_empty_tokens() {
        let parsed: GrantSet = serde_json::from_str(r#"["", "admin", "admin"]"#).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains("admin"));
    }

    proptest::proptest! {
        #[test]
        fn prop_len_matches_distinct_non_empty(tokens in proptest::collection::vec("[a-c ]{0,3}", 0..20)) {
            let mut set = GrantSet::new();
            let mut previous = 0;
            for token in &tokens {
                set.insert(token.as_str());
                proptest::prop_assert!(set.len() >= previous);
                previous = set.len();
            }

            let distinct: std::collections::BTreeSet<_> =
                tokens.iter().filter(|t| !t.is_empty()).collect();
            proptest::prop_assert_eq!(set.len(), distinct.len());
        }
    }
}
