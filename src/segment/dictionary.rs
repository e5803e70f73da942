//! Forward longest-match segmentation over the core dictionary.

use std::sync::Arc;

use crate::configuration::Configuration;
use crate::model::Lexicon;
use crate::segment::atom::atoms;
use crate::segment::index::IndexExpansion;
use crate::segment::text::CharSeq;
use crate::segment::{Finisher, Segment, Term, Word};

/// The fastest engine: at each position take the longest dictionary word
/// that ends on an atom boundary, or the atom itself.
#[derive(Debug)]
pub struct DictionarySegment {
    name: &'static str,
    lexicon: Arc<Lexicon>,
    normalize: bool,
    finisher: Finisher,
}

impl DictionarySegment {
    /// Create an engine over `lexicon`.
    pub fn new(name: &'static str, lexicon: Arc<Lexicon>, config: &Configuration) -> Self {
        let mut finisher = Finisher::new().with_number_quantifier(config.number_quantifier_recognize);
        if config.index_mode {
            finisher = finisher.with_index_expansion(IndexExpansion::new(
                vec![Arc::clone(&lexicon)],
                config.min_index_word_length,
            ));
        }
        DictionarySegment {
            name,
            lexicon,
            normalize: config.normalization,
            finisher,
        }
    }

    fn longest_match(&self, chars: &[char], words: &mut Vec<Word>) {
        let atoms = atoms(chars);
        let mut boundary = vec![false; chars.len() + 1];
        for atom in &atoms {
            boundary[atom.start] = true;
        }
        boundary[chars.len()] = true;

        let mut atom_index = 0;
        while atom_index < atoms.len() {
            let atom = atoms[atom_index];
            let best = self
                .lexicon
                .prefixes(&chars[atom.start..])
                .filter(|(len, _)| boundary[atom.start + len])
                .last();
            let word = match best {
                Some((len, entry)) if len >= atom.len() => Word {
                    start: atom.start,
                    end: atom.start + len,
                    nature: entry.nature().map(str::to_string),
                },
                _ => Word {
                    start: atom.start,
                    end: atom.end,
                    nature: atom.kind.nature().map(str::to_string),
                },
            };
            while atom_index < atoms.len() && atoms[atom_index].start < word.end {
                atom_index += 1;
            }
            words.push(word);
        }
    }
}

impl Segment for DictionarySegment {
    fn segment(&self, text: &str) -> Vec<Term> {
        let seq = CharSeq::new(text, self.normalize);
        let mut words = Vec::new();
        self.longest_match(seq.chars(), &mut words);
        self.finisher.finish(&seq, words)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
