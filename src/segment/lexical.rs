//! Composite engines built from linear taggers (perceptron or CRF).
//!
//! A character tagger segments each CJK run with `B`/`M`/`E`/`S` labels.
//! An optional part-of-speech tagger labels the words, and an optional
//! named entity tagger, which reads those labels, merges words into
//! entities with `B-x`/`M-x`/`E-x`/`S-x`/`O` labels.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::model::{Lexicon, TaggingModel};
use crate::segment::atom::{AtomKind, atoms, is_cjk};
use crate::segment::index::IndexExpansion;
use crate::segment::text::CharSeq;
use crate::segment::{Finisher, Segment, Term, Word};

/// Which stages a composite engine runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompositeLevel {
    /// Word segmentation only.
    Segmenter,
    /// Segmentation and part-of-speech tagging.
    SegmenterPos,
    /// Segmentation, part of speech and named entities.
    Full,
}

impl fmt::Display for CompositeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositeLevel::Segmenter => "segmenter",
            CompositeLevel::SegmenterPos => "segmenter+pos",
            CompositeLevel::Full => "segmenter+pos+ner",
        };
        f.write_str(name)
    }
}

/// The taggers of a composite engine.
#[derive(Clone, Debug)]
pub struct CompositeModels {
    /// Character tagger for word segmentation.
    pub segmenter: Arc<TaggingModel>,
    /// Part-of-speech tagger.
    pub tagger: Option<Arc<TaggingModel>>,
    /// Named entity tagger; ignored without a part-of-speech tagger.
    pub recognizer: Option<Arc<TaggingModel>>,
}

impl CompositeModels {
    /// The stages these models support.
    pub fn level(&self) -> CompositeLevel {
        match (&self.tagger, &self.recognizer) {
            (None, _) => CompositeLevel::Segmenter,
            (Some(_), None) => CompositeLevel::SegmenterPos,
            (Some(_), Some(_)) => CompositeLevel::Full,
        }
    }
}

/// Perceptron or CRF composite engine.
#[derive(Debug)]
pub struct LexicalSegment {
    name: &'static str,
    segmenter: Arc<TaggingModel>,
    tagger: Option<Arc<TaggingModel>>,
    recognizer: Option<Arc<TaggingModel>>,
    normalize: bool,
    finisher: Finisher,
}

impl LexicalSegment {
    /// Create an engine from `models`.
    ///
    /// `custom` words are merged over the tagged words when the custom
    /// dictionary is enabled. `index_lexicon` supplies the sub-words of
    /// index mode, together with the custom words.
    pub fn new(
        name: &'static str,
        models: CompositeModels,
        custom: Option<Arc<Lexicon>>,
        index_lexicon: Option<Arc<Lexicon>>,
        config: &Configuration,
    ) -> Self {
        let custom = custom.filter(|_| config.custom_dictionary);
        let mut finisher = Finisher::new().with_number_quantifier(config.number_quantifier_recognize);
        if let Some(custom) = &custom {
            finisher = finisher.with_custom_merge(Arc::clone(custom));
        }
        if config.index_mode {
            let lexicons = index_lexicon.into_iter().chain(custom).collect();
            finisher = finisher
                .with_index_expansion(IndexExpansion::new(lexicons, config.min_index_word_length));
        }

        let recognizer = models.recognizer.filter(|_| models.tagger.is_some());
        LexicalSegment {
            name,
            segmenter: models.segmenter,
            tagger: models.tagger,
            recognizer,
            normalize: config.normalization,
            finisher,
        }
    }

    /// The stages this engine runs.
    pub fn level(&self) -> CompositeLevel {
        match (&self.tagger, &self.recognizer) {
            (None, _) => CompositeLevel::Segmenter,
            (Some(_), None) => CompositeLevel::SegmenterPos,
            (Some(_), Some(_)) => CompositeLevel::Full,
        }
    }

    fn segment_run(&self, chars: &[char], offset: usize, words: &mut Vec<Word>) {
        let cells: Vec<String> = chars.iter().map(char::to_string).collect();
        let rows: Vec<Vec<&str>> = cells.iter().map(|c| vec![c.as_str()]).collect();
        let labels = self.segmenter.tag_labels(&rows);

        let mut start = 0;
        for i in 1..=chars.len() {
            let boundary = i == chars.len()
                || matches!(labels[i], "B" | "S")
                || matches!(labels[i - 1], "E" | "S");
            if boundary {
                words.push(Word {
                    start: offset + start,
                    end: offset + i,
                    nature: None,
                });
                start = i;
            }
        }
    }

    fn tag(&self, chars: &[char], words: &mut [Word]) {
        let Some(tagger) = &self.tagger else { return };
        let texts: Vec<String> = words
            .iter()
            .map(|w| chars[w.start..w.end].iter().collect())
            .collect();
        let firsts: Vec<String> = words.iter().map(|w| chars[w.start].to_string()).collect();
        let lasts: Vec<String> = words.iter().map(|w| chars[w.end - 1].to_string()).collect();
        let rows: Vec<Vec<&str>> = (0..words.len())
            .map(|i| vec![texts[i].as_str(), firsts[i].as_str(), lasts[i].as_str()])
            .collect();

        for (word, label) in words.iter_mut().zip(tagger.tag_labels(&rows)) {
            if chars[word.start..word.end].iter().all(|&c| is_cjk(c)) {
                word.nature = Some(label.to_string());
            }
        }
    }

    fn recognize(&self, chars: &[char], words: Vec<Word>) -> Vec<Word> {
        let Some(recognizer) = &self.recognizer else {
            return words;
        };
        let texts: Vec<String> = words
            .iter()
            .map(|w| chars[w.start..w.end].iter().collect())
            .collect();
        let rows: Vec<Vec<&str>> = words
            .iter()
            .zip(&texts)
            .map(|(w, t)| vec![t.as_str(), w.nature.as_deref().unwrap_or("")])
            .collect();
        let labels = recognizer.tag_labels(&rows);

        let mut merged = Vec::with_capacity(words.len());
        let mut pending: Option<(Word, String)> = None;
        for (word, label) in words.iter().zip(labels) {
            let (position, kind) = label.split_once('-').unwrap_or((label, ""));
            match position {
                "B" => {
                    flush(&mut pending, &mut merged);
                    pending = Some((word.clone(), kind.to_string()));
                }
                "M" | "E" if pending.as_ref().is_some_and(|(_, k)| k == kind) => {
                    if let Some((entity, _)) = pending.as_mut() {
                        entity.end = word.end;
                    }
                    if position == "E" {
                        if let Some((mut entity, kind)) = pending.take() {
                            entity.nature = Some(kind);
                            merged.push(entity);
                        }
                    }
                }
                "S" if !kind.is_empty() => {
                    flush(&mut pending, &mut merged);
                    merged.push(Word {
                        nature: Some(kind.to_string()),
                        ..word.clone()
                    });
                }
                _ => {
                    flush(&mut pending, &mut merged);
                    merged.push(word.clone());
                }
            }
        }
        flush(&mut pending, &mut merged);
        merged
    }
}

/// Emit an entity that never saw its closing label as plain words.
fn flush(pending: &mut Option<(Word, String)>, merged: &mut Vec<Word>) {
    if let Some((word, _)) = pending.take() {
        merged.push(word);
    }
}

impl Segment for LexicalSegment {
    fn segment(&self, text: &str) -> Vec<Term> {
        let seq = CharSeq::new(text, self.normalize);
        let chars = seq.chars();
        let mut all = Vec::new();

        for sentence in seq.sentences() {
            let sentence_chars = &chars[sentence.clone()];
            let mut words = Vec::new();
            let atoms = atoms(sentence_chars);
            let mut i = 0;
            while i < atoms.len() {
                if atoms[i].kind == AtomKind::Cjk {
                    let start = atoms[i].start;
                    while i < atoms.len() && atoms[i].kind == AtomKind::Cjk {
                        i += 1;
                    }
                    let end = atoms[i - 1].end;
                    self.segment_run(
                        &sentence_chars[start..end],
                        sentence.start + start,
                        &mut words,
                    );
                } else {
                    words.push(Word {
                        start: sentence.start + atoms[i].start,
                        end: sentence.start + atoms[i].end,
                        nature: atoms[i].kind.nature().map(str::to_string),
                    });
                    i += 1;
                }
            }

            // Taggers only see real words.
            words.retain(|w| !chars[w.start..w.end].iter().all(|c| c.is_whitespace()));
            self.tag(chars, &mut words);
            all.extend(self.recognize(chars, words));
        }

        self.finisher.finish(&seq, all)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
