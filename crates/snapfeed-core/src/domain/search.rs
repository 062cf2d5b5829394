//! Caption tokenization for exact-token post search.

use std::collections::HashSet;

const DEFAULT_FILLER_WORDS: &str = include_str!("../../assets/filler_words.txt");

/// Words dropped from captions before they become search tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerWords(HashSet<String>);

impl FillerWords {
    /// Parse a word list, one word per line. Blank lines and `#` comments are ignored.
    pub fn parse(source: &str) -> Self {
        Self(
            source
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_lowercase)
                .collect(),
        )
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FillerWords {
    fn default() -> Self {
        Self::parse(DEFAULT_FILLER_WORDS)
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | '?' | '!' | '#')
}

/// Split a caption into lowercase search tokens, in caption order.
pub fn tokenize(caption: &str, filler: &FillerWords) -> Vec<String> {
    caption
        .split(is_separator)
        .map(str::to_lowercase)
        .filter(|token| !token.is_empty() && !filler.contains(token))
        .collect()
}

/// Normalize a search term the same way captions are tokenized.
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
