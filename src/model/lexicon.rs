//! Word dictionaries with part-of-speech natures and frequencies.
//!
//! Text format, one word per line:
//!
//! ```text
//! 中国 ns 3000
//! 发展 vn 2000 v 1500
//! New York University	nt 10
//! ```
//!
//! The word ends at the first tab if the line has one (so phrases may
//! contain spaces), otherwise at the first whitespace. It is followed by
//! `nature frequency` pairs. Core dictionaries need at least one pair;
//! custom dictionaries default to `nz 1`. Blank lines and lines starting
//! with `#` are skipped, and the first occurrence of a word wins.

use std::sync::Arc;

use crate::error::{HansegError, Result};
use crate::model::trie::Trie;

/// Nature given to custom words without an explicit one.
pub const DEFAULT_CUSTOM_NATURE: &str = "nz";

/// One dictionary word.
#[derive(Clone, Debug, PartialEq)]
pub struct LexiconEntry {
    /// The word.
    pub word: String,
    /// `(nature, frequency)` pairs, most likely first.
    pub natures: Vec<(String, u32)>,
    /// Sum of all nature frequencies.
    pub frequency: u32,
}

impl LexiconEntry {
    /// The most likely nature.
    pub fn nature(&self) -> Option<&str> {
        self.natures.first().map(|(n, _)| n.as_str())
    }

    /// Whether `nature` is one of this word's natures.
    pub fn has_nature(&self, nature: &str) -> bool {
        self.natures.iter().any(|(n, _)| n == nature)
    }
}

/// A dictionary searchable by prefix.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    trie: Trie,
    entries: Vec<LexiconEntry>,
    total_frequency: u64,
}

impl Lexicon {
    /// Create an empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a core dictionary (every word needs a nature and frequency).
    pub fn parse_core(text: &str) -> Result<Self> {
        Self::parse(text, None)
    }

    /// Parse a custom dictionary (natures optional).
    pub fn parse_custom(text: &str) -> Result<Self> {
        Self::parse(text, Some((DEFAULT_CUSTOM_NATURE, 1)))
    }

    fn parse(text: &str, default: Option<(&str, u32)>) -> Result<Self> {
        let mut lexicon = Lexicon::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim_start_matches('\u{feff}').trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (word, rest) = match line.split_once('\t') {
                Some((word, rest)) => (word.trim(), rest),
                None => {
                    let line = line.trim();
                    match line.split_once(char::is_whitespace) {
                        Some((word, rest)) => (word, rest),
                        None => (line, ""),
                    }
                }
            };

            let fields: Vec<&str> = rest.split_whitespace().collect();
            if fields.len() % 2 != 0 {
                return Err(HansegError::parse(format!(
                    "line {}: expected 'nature frequency' pairs after '{word}'",
                    line_no + 1
                )));
            }

            let mut natures = Vec::with_capacity(fields.len() / 2);
            for pair in fields.chunks(2) {
                let frequency = pair[1].parse::<u32>().map_err(|_| {
                    HansegError::parse(format!(
                        "line {}: invalid frequency '{}' for '{word}'",
                        line_no + 1,
                        pair[1]
                    ))
                })?;
                natures.push((pair[0].to_string(), frequency));
            }

            if natures.is_empty() {
                match default {
                    Some((nature, frequency)) => natures.push((nature.to_string(), frequency)),
                    None => {
                        return Err(HansegError::parse(format!(
                            "line {}: '{word}' has no nature",
                            line_no + 1
                        )));
                    }
                }
            }

            lexicon.insert(word, natures);
        }
        Ok(lexicon)
    }

    /// Add a word unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, word: &str, natures: Vec<(String, u32)>) -> bool {
        if word.is_empty() || self.trie.get(word).is_some() {
            return false;
        }
        let frequency = natures.iter().map(|(_, f)| *f).sum::<u32>();
        let id = self.entries.len() as u32;
        self.trie.insert(word, id);
        self.total_frequency += frequency as u64;
        self.entries.push(LexiconEntry {
            word: word.to_string(),
            natures,
            frequency,
        });
        true
    }

    /// Merge several lexicons; earlier ones win on duplicates.
    pub fn merge(lexicons: &[Arc<Lexicon>]) -> Lexicon {
        let mut merged = Lexicon::new();
        for lexicon in lexicons {
            for entry in &lexicon.entries {
                merged.insert(&entry.word, entry.natures.clone());
            }
        }
        merged
    }

    /// Look up a word.
    pub fn get(&self, word: &str) -> Option<&LexiconEntry> {
        self.trie.get(word).map(|id| &self.entries[id as usize])
    }

    /// Whether the word is present.
    pub fn contains(&self, word: &str) -> bool {
        self.trie.get(word).is_some()
    }

    /// Every word that is a prefix of `chars`, as `(length in chars, entry)`.
    pub fn prefixes<'a>(
        &'a self,
        chars: &'a [char],
    ) -> impl Iterator<Item = (usize, &'a LexiconEntry)> + 'a {
        self.trie
            .prefixes(chars)
            .map(move |(len, id)| (len, &self.entries[id as usize]))
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    /// Sum of all word frequencies.
    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no words.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
