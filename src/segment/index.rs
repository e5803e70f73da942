//! Multi-granularity expansion for index mode.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::Lexicon;
use crate::segment::Word;
use crate::segment::atom::{AtomKind, atoms};

/// Finds the shorter words inside a long word.
///
/// A word longer than `min_length` characters yields every dictionary word
/// of at least `min_length` characters it contains, plus its Latin and
/// number atoms of that length. Sub-words respect atom boundaries and never
/// repeat the word itself.
#[derive(Clone, Debug)]
pub struct IndexExpansion {
    lexicons: Vec<Arc<Lexicon>>,
    min_length: usize,
}

impl IndexExpansion {
    /// Expand with the words of `lexicons`.
    pub fn new(lexicons: Vec<Arc<Lexicon>>, min_length: usize) -> Self {
        IndexExpansion {
            lexicons,
            min_length: min_length.max(1),
        }
    }

    /// Minimum sub-word length in characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Sub-words of `word`, ordered by start then end.
    pub fn sub_words(&self, chars: &[char], word: &Word) -> Vec<Word> {
        let len = word.end - word.start;
        if len <= self.min_length {
            return Vec::new();
        }
        let span = &chars[word.start..word.end];
        let atoms = atoms(span);
        let mut boundary = vec![false; len + 1];
        for atom in &atoms {
            boundary[atom.start] = true;
        }
        boundary[len] = true;

        let mut found: BTreeMap<(usize, usize), Option<String>> = BTreeMap::new();
        for atom in &atoms {
            for lexicon in &self.lexicons {
                for (word_len, entry) in lexicon.prefixes(&span[atom.start..]) {
                    let end = atom.start + word_len;
                    if word_len >= self.min_length && boundary[end] && word_len < len {
                        found
                            .entry((atom.start, end))
                            .or_insert_with(|| entry.nature().map(str::to_string));
                    }
                }
            }
            if matches!(atom.kind, AtomKind::Latin | AtomKind::Digit)
                && atom.len() >= self.min_length
                && atom.len() < len
            {
                found
                    .entry((atom.start, atom.end))
                    .or_insert_with(|| atom.kind.nature().map(str::to_string));
            }
        }

        found
            .into_iter()
            .map(|((start, end), nature)| Word {
                start: word.start + start,
                end: word.start + end,
                nature,
            })
            .collect()
    }
}
