//! Stop word lists (one word per line).

use std::collections::HashSet;

/// A set of words removed from the token stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Parse one word per line, ignoring blanks and `#` comments.
    pub fn parse(text: &str) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        StopWords { words }
    }

    /// Build from a list of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopWords {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `word` is a stop word.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// The underlying set.
    pub fn words(&self) -> &HashSet<String> {
        &self.words
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
