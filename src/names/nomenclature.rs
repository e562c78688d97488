//! Canonical multi-word identifiers.
//!
//! A [`Name`] is the unit every other calculator in this crate works with:
//! an ordered, non-empty sequence of lowercase word tokens (`identity`,
//! `provider`). Downstream name calculators rewrite words independently
//! (capitalization, pluralization, underscoring), so names are carried as
//! word lists rather than strings all the way to the point where a
//! target-language rendering is actually needed.

use thiserror::Error;

/// An ordered, non-empty sequence of lowercase word tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    words: Vec<String>,
}

/// Errors raised while building or parsing a [`Name`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// A name must contain at least one word.
    #[error("name must contain at least one word")]
    Empty,

    /// A word token was empty (e.g. two consecutive separators in the source).
    #[error("name contains an empty word token")]
    EmptyToken,
}

impl Name {
    /// Builds a name from an explicit, already-lowercase word list.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Empty`] if `words` is empty, or
    /// [`NameError::EmptyToken`] if any word is empty.
    pub fn from_words<I, S>(words: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(NameError::Empty);
        }
        if words.iter().any(|w| w.is_empty()) {
            return Err(NameError::EmptyToken);
        }
        Ok(Self {
            words: words.into_iter().map(|w| w.to_ascii_lowercase()).collect(),
        })
    }

    /// Builds a single-word name. Convenience for the common case.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::EmptyToken`] if `word` is empty.
    pub fn word(word: impl Into<String>) -> Result<Self, NameError> {
        Self::from_words([word.into()])
    }

    /// Parses a source identifier, splitting on camelCase and `_`
    /// boundaries, lowercasing every token, and rejecting empty tokens.
    ///
    /// This is the inverse of [`crate::names::calculator::NameCalculator::tag`]:
    /// `Name::parse(calc.tag(&n)) == Ok(n)` for every valid `n`.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Empty`] if `source` contains no alphanumeric
    /// characters at all.
    pub fn parse(source: &str) -> Result<Self, NameError> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut prev_lower = false;

        for ch in source.chars() {
            if ch == '_' || ch == '-' || ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                prev_lower = false;
                continue;
            }
            if ch.is_uppercase() && prev_lower {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(ch.to_ascii_lowercase());
            prev_lower = ch.is_lowercase() || ch.is_numeric();
        }
        if !current.is_empty() {
            words.push(current);
        }

        if words.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self { words })
    }

    /// Concatenates several names into one, preserving word order.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Empty`] only if `names` is itself empty (in
    /// which case there is no word to concatenate).
    pub fn cat(names: &[&Name]) -> Result<Self, NameError> {
        let words: Vec<String> = names.iter().flat_map(|n| n.words.iter().cloned()).collect();
        Self::from_words(words)
    }

    /// Token-wise equality. Equivalent to `==`, exposed as a named
    /// operation because spec discussions about nomenclature refer to it
    /// explicitly as a first-class operation.
    pub fn equals(&self, other: &Name) -> bool {
        self.words == other.words
    }

    /// Returns the word tokens, unchanged, in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }
}
