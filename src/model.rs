//! Statistical models and their process-wide registry.
//!
//! Every model a strategy needs is identified by a [`ModelKey`] (what kind of
//! model, and which file it is read from) and loaded at most once per
//! process through the [`registry::ModelRegistry`]. A loaded model is handed
//! out as a [`ModelHandle`], a cheap clone of an immutable `Arc`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod bigram;
pub mod lexicon;
pub mod loader;
pub mod registry;
pub mod stop_words;
pub mod tagger;
pub mod trie;

pub use bigram::BigramTable;
pub use lexicon::{Lexicon, LexiconEntry};
pub use registry::{ModelFailure, ModelRegistry, ModelState};
pub use stop_words::StopWords;
pub use tagger::{FeatureTemplate, LinearModel, TaggingModel};
pub use trie::Trie;

/// The kinds of model the strategies load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Core dictionary with natures and frequencies.
    CoreDictionary,
    /// Word bigram frequencies.
    BigramDictionary,
    /// User supplied words.
    CustomDictionary,
    /// Words dropped from the token stream.
    StopWords,
    /// Perceptron character tagger for word segmentation.
    PerceptronCws,
    /// Perceptron part-of-speech tagger.
    PerceptronPos,
    /// Perceptron named entity recognizer.
    PerceptronNer,
    /// CRF character tagger for word segmentation.
    CrfCws,
    /// CRF part-of-speech tagger.
    CrfPos,
    /// CRF named entity recognizer.
    CrfNer,
}

impl ModelKind {
    /// Stable identifier used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::CoreDictionary => "core_dictionary",
            ModelKind::BigramDictionary => "bigram_dictionary",
            ModelKind::CustomDictionary => "custom_dictionary",
            ModelKind::StopWords => "stop_words",
            ModelKind::PerceptronCws => "perceptron_cws",
            ModelKind::PerceptronPos => "perceptron_pos",
            ModelKind::PerceptronNer => "perceptron_ner",
            ModelKind::CrfCws => "crf_cws",
            ModelKind::CrfPos => "crf_pos",
            ModelKind::CrfNer => "crf_ner",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of one model in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelKey {
    kind: ModelKind,
    path: PathBuf,
}

impl ModelKey {
    /// Key for a model of `kind` read from `path`.
    pub fn new<P: Into<PathBuf>>(kind: ModelKind, path: P) -> Self {
        ModelKey {
            kind,
            path: path.into(),
        }
    }

    /// The model kind.
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// The file the model is read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.path.display())
    }
}

/// Shared, immutable reference to a loaded model.
#[derive(Clone, Debug)]
pub enum ModelHandle {
    /// Core or custom dictionary.
    Lexicon(Arc<Lexicon>),
    /// Bigram table.
    Bigram(Arc<BigramTable>),
    /// Stop word set.
    StopWords(Arc<StopWords>),
    /// Linear sequence tagger (perceptron or CRF).
    Tagger(Arc<TaggingModel>),
}

impl ModelHandle {
    /// Short name of the variant.
    pub fn variant(&self) -> &'static str {
        match self {
            ModelHandle::Lexicon(_) => "lexicon",
            ModelHandle::Bigram(_) => "bigram",
            ModelHandle::StopWords(_) => "stop_words",
            ModelHandle::Tagger(_) => "tagger",
        }
    }

    /// Whether both handles point at the same loaded model.
    pub fn ptr_eq(&self, other: &ModelHandle) -> bool {
        match (self, other) {
            (ModelHandle::Lexicon(a), ModelHandle::Lexicon(b)) => Arc::ptr_eq(a, b),
            (ModelHandle::Bigram(a), ModelHandle::Bigram(b)) => Arc::ptr_eq(a, b),
            (ModelHandle::StopWords(a), ModelHandle::StopWords(b)) => Arc::ptr_eq(a, b),
            (ModelHandle::Tagger(a), ModelHandle::Tagger(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The lexicon, if this handle holds one.
    pub fn as_lexicon(&self) -> Option<&Arc<Lexicon>> {
        match self {
            ModelHandle::Lexicon(lexicon) => Some(lexicon),
            _ => None,
        }
    }

    /// The bigram table, if this handle holds one.
    pub fn as_bigram(&self) -> Option<&Arc<BigramTable>> {
        match self {
            ModelHandle::Bigram(table) => Some(table),
            _ => None,
        }
    }

    /// The stop words, if this handle holds them.
    pub fn as_stop_words(&self) -> Option<&Arc<StopWords>> {
        match self {
            ModelHandle::StopWords(words) => Some(words),
            _ => None,
        }
    }

    /// The tagging model, if this handle holds one.
    pub fn as_tagger(&self) -> Option<&Arc<TaggingModel>> {
        match self {
            ModelHandle::Tagger(model) => Some(model),
            _ => None,
        }
    }
}
