//! Segmentation engines.
//!
//! An engine turns text into [`Term`]s. Engines are built once by the
//! factory, hold only immutable shared models, and are safe to call from
//! many threads at once. Three families are provided:
//!
//! - [`lattice::LatticeSegment`]: word lattice plus best-path search
//!   (Viterbi, Dijkstra or N-shortest paths)
//! - [`dictionary::DictionarySegment`]: forward longest match over the core
//!   dictionary
//! - [`lexical::LexicalSegment`]: perceptron or CRF taggers for
//!   segmentation, part of speech and named entities
//!
//! All of them share the post-processing of [`Finisher`]: custom dictionary
//! merging, numeral-quantifier merging and index-mode expansion.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::Lexicon;
use crate::segment::index::IndexExpansion;
use crate::segment::text::CharSeq;

pub mod atom;
pub mod custom;
pub mod dictionary;
pub mod index;
pub mod lattice;
pub mod lexical;
pub mod path;
pub mod quantifier;
pub mod recognition;
pub mod text;
pub mod word_net;

/// A word of the current input, by character positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    /// First character.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
    /// Part of speech, when known.
    pub nature: Option<String>,
}

/// One segmented term.
///
/// `start` and `end` are byte offsets into the text passed to
/// [`Segment::segment`], even when the engine normalizes that text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Surface form (normalized when normalization is enabled).
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Part of speech, when known.
    pub nature: Option<String>,
    /// Whether this is an index-mode sub-word of the previous primary term.
    pub overlap: bool,
}

/// A segmentation engine.
pub trait Segment: Send + Sync + fmt::Debug {
    /// Segment `text` into terms, in text order.
    ///
    /// Index-mode sub-words follow the term that contains them.
    fn segment(&self, text: &str) -> Vec<Term>;

    /// Name of the engine (for logging and debugging).
    fn name(&self) -> &'static str;
}

/// Post-processing shared by every engine.
#[derive(Clone, Debug, Default)]
pub struct Finisher {
    custom: Option<Arc<Lexicon>>,
    number_quantifier: bool,
    index: Option<IndexExpansion>,
}

impl Finisher {
    /// A finisher that only converts words to terms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge adjacent words that spell a word of `custom`.
    pub fn with_custom_merge(mut self, custom: Arc<Lexicon>) -> Self {
        self.custom = Some(custom);
        self
    }

    /// Merge numerals with the following quantifier.
    pub fn with_number_quantifier(mut self, enable: bool) -> Self {
        self.number_quantifier = enable;
        self
    }

    /// Emit sub-words of long terms.
    pub fn with_index_expansion(mut self, expansion: IndexExpansion) -> Self {
        self.index = Some(expansion);
        self
    }

    /// Whether index-mode expansion is on.
    pub fn index_mode(&self) -> bool {
        self.index.is_some()
    }

    /// Turn the words of `seq` into terms.
    ///
    /// Whitespace-only words are dropped.
    pub fn finish(&self, seq: &CharSeq, mut words: Vec<Word>) -> Vec<Term> {
        let chars = seq.chars();
        if let Some(custom) = &self.custom {
            words = custom::merge_custom(chars, words, custom);
        }
        if self.number_quantifier {
            words = quantifier::merge_number_quantifiers(chars, words);
        }

        let mut terms = Vec::with_capacity(words.len());
        for word in &words {
            if chars[word.start..word.end].iter().all(|c| c.is_whitespace()) {
                continue;
            }
            terms.push(to_term(seq, word, false));
            if let Some(index) = &self.index {
                terms.extend(
                    index
                        .sub_words(chars, word)
                        .iter()
                        .map(|sub| to_term(seq, sub, true)),
                );
            }
        }
        terms
    }
}

fn to_term(seq: &CharSeq, word: &Word, overlap: bool) -> Term {
    let bytes = seq.byte_range(word.start, word.end);
    Term {
        text: seq.text(word.start, word.end),
        start: bytes.start,
        end: bytes.end,
        nature: word.nature.clone(),
        overlap,
    }
}
