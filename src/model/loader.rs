//! Reading model files into [`ModelHandle`]s.
//!
//! Loaders only ever see the file system through an [`IsolationScope`], so a
//! model path outside the granted directories fails with an isolation
//! violation before any byte is read.

use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::error::Result;
use crate::isolation::IsolationScope;
use crate::model::{
    BigramTable, Lexicon, LinearModel, ModelHandle, ModelKey, ModelKind, StopWords, TaggingModel,
};

/// Templates of perceptron segmentation models.
///
/// Rows have one column: the character.
pub const PERCEPTRON_CWS_TEMPLATES: &[&str] = &[
    "U1:%x[-1,0]",
    "U2:%x[0,0]",
    "U3:%x[1,0]",
    "U4:%x[-2,0]/%x[-1,0]",
    "U5:%x[-1,0]/%x[0,0]",
    "U6:%x[0,0]/%x[1,0]",
    "U7:%x[1,0]/%x[2,0]",
];

/// Templates of perceptron part-of-speech models.
///
/// Rows have three columns: the word, its first and its last character.
pub const PERCEPTRON_POS_TEMPLATES: &[&str] = &[
    "U1:%x[0,0]",
    "U2:%x[-1,0]",
    "U3:%x[1,0]",
    "U4:%x[0,1]",
    "U5:%x[0,2]",
];

/// Templates of perceptron named entity models.
///
/// Rows have two columns: the word and its part of speech.
pub const PERCEPTRON_NER_TEMPLATES: &[&str] = &[
    "U1:%x[0,0]",
    "U2:%x[0,1]",
    "U3:%x[-1,0]",
    "U4:%x[1,0]",
    "U5:%x[-1,1]/%x[0,1]",
];

/// Load the model identified by `key`.
pub fn load(key: &ModelKey, scope: &IsolationScope<'_>) -> Result<ModelHandle> {
    let started = Instant::now();
    let text = scope.read_to_string(key.path())?;

    let handle = match key.kind() {
        ModelKind::CoreDictionary => ModelHandle::Lexicon(Arc::new(Lexicon::parse_core(&text)?)),
        ModelKind::CustomDictionary => {
            ModelHandle::Lexicon(Arc::new(Lexicon::parse_custom(&text)?))
        }
        ModelKind::BigramDictionary => ModelHandle::Bigram(Arc::new(BigramTable::parse(&text)?)),
        ModelKind::StopWords => ModelHandle::StopWords(Arc::new(StopWords::parse(&text))),
        ModelKind::PerceptronCws => tagger(&text, PERCEPTRON_CWS_TEMPLATES)?,
        ModelKind::PerceptronPos => tagger(&text, PERCEPTRON_POS_TEMPLATES)?,
        ModelKind::PerceptronNer => tagger(&text, PERCEPTRON_NER_TEMPLATES)?,
        ModelKind::CrfCws | ModelKind::CrfPos | ModelKind::CrfNer => tagger(&text, &[])?,
    };

    debug!(
        "Loaded {} ({}) in {:?}",
        key,
        handle.variant(),
        started.elapsed()
    );
    Ok(handle)
}

fn tagger(text: &str, default_templates: &[&str]) -> Result<ModelHandle> {
    let model = LinearModel::from_json(text)?;
    Ok(ModelHandle::Tagger(Arc::new(TaggingModel::compile(
        model,
        default_templates,
    )?)))
}
