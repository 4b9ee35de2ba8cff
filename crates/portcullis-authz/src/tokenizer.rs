//! Splitting attribute values into grant tokens.

use serde::{Deserialize, Serialize};

/// Delimiter set used when none is configured.
pub const DEFAULT_DELIMITER: &str = ",";

/// What happens to whitespace around a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenTrim {
    /// Tokens are kept exactly as they appear between delimiters.
    #[default]
    Preserve,
    /// Surrounding whitespace is removed; tokens left empty are dropped.
    Whitespace,
}

/// Splits `source` on any character of `delimiters`.
///
/// Runs of delimiters, and delimiters at either end, never yield empty
/// tokens. An empty delimiter set yields the whole (non-empty) string as a
/// single token.
///
/// # Example
///
/// ```
/// use portcullis_authz::{tokenize, TokenTrim};
///
/// let tokens: Vec<_> = tokenize(",a;;b,", ",;", TokenTrim::Preserve).collect();
/// assert_eq!(tokens, ["a", "b"]);
///
/// let tokens: Vec<_> = tokenize("read, write", ",", TokenTrim::Whitespace).collect();
/// assert_eq!(tokens, ["read", "write"]);
/// ```
pub fn tokenize<'a>(
    source: &'a str,
    delimiters: &'a str,
    trim: TokenTrim,
) -> impl Iterator<Item = &'a str> + 'a {
    source
        .split(move |c: char| delimiters.contains(c))
        .map(move |token| match trim {
            TokenTrim::Preserve => token,
            TokenTrim::Whitespace => token.trim(),
        })
        .filter(|token| !token.is_empty())
}
