//! Free-text classifier answers to canonical PokéAPI keys.
//!
//! Vision models rarely answer with a bare key. Typical replies:
//! 1. Decorated names: `Pikachu!`, `"Mr. Mime"`, `Farfetch'd`
//! 2. Hedged lists: `Pikachu, possibly Raichu` or `Pikachu or Raichu`
//! 3. Accented spellings: `Flabébé`
//!
//! Only the first candidate is kept. The result is lowercase ASCII
//! letters and digits joined by single hyphens.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PokedexError, Result};

/// Characters that separate hedged candidates in a model answer.
const CANDIDATE_SEPARATORS: &[char] = &[',', ';', '/', '\n', '|'];

/// A normalized species name, the only valid key for lookups and the cache.
///
/// Always non-empty and made of `[a-z0-9]` runs joined by single hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Accept `s` only if it is already canonical.
    pub fn parse(s: &str) -> Option<Self> {
        let canonical = canonicalize(s);
        if !canonical.is_empty() && canonical == s {
            Some(Self(canonical))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CanonicalKey {
    type Error = PokedexError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value).ok_or(PokedexError::InvalidName(value))
    }
}

impl From<CanonicalKey> for String {
    fn from(key: CanonicalKey) -> Self {
        key.0
    }
}

/// Normalize a classifier guess into a [`CanonicalKey`].
///
/// Takes the first candidate that survives normalization, so
/// `"Pikachu, possibly Raichu"` and `"Pikachu or Raichu"` both yield
/// `pikachu`.
///
/// # Errors
///
/// Returns [`PokedexError::InvalidName`] when nothing usable remains
/// (e.g. a whitespace-only or punctuation-only guess).
pub fn normalize_name(guess: &str) -> Result<CanonicalKey> {
    guess
        .split(CANDIDATE_SEPARATORS)
        .flat_map(split_on_or)
        .map(|candidate| canonicalize(&candidate))
        .find(|key| !key.is_empty())
        .map(CanonicalKey)
        .ok_or_else(|| PokedexError::InvalidName(guess.to_string()))
}

/// Split a segment into candidates at every word that reads "or" once
/// punctuation is dropped (`or`, `(or`, `or:`).
fn split_on_or(segment: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in segment.split_whitespace() {
        if canonicalize(word) == "or" {
            candidates.push(current.join(" "));
            current.clear();
        } else {
            current.push(word);
        }
    }
    candidates.push(current.join(" "));
    candidates
}

/// Lowercase, fold accents, drop everything outside `[a-z0-9 -]`, and
/// turn whitespace/hyphen runs into single hyphens with none at the ends.
fn canonicalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
    }

    out
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        other => other,
    }
}
