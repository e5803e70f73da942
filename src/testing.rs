//! Small model files for tests, doctests and benchmarks.
//!
//! [`write_models`] lays out a complete model root (dictionaries, stop
//! words, perceptron and CRF models) at the default relative paths, so that
//! every strategy can be built against a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::configuration::{
    DEFAULT_BIGRAM_DICTIONARY_PATH, DEFAULT_CORE_DICTIONARY_PATH, DEFAULT_CRF_CWS_PATH,
    DEFAULT_CRF_NER_PATH, DEFAULT_CRF_POS_PATH, DEFAULT_CUSTOM_DICTIONARY_PATH,
    DEFAULT_PERCEPTRON_CWS_PATH, DEFAULT_PERCEPTRON_NER_PATH, DEFAULT_PERCEPTRON_POS_PATH,
    DEFAULT_STOP_WORDS_PATH,
};
use crate::error::Result;
use crate::model::LinearModel;

/// Core dictionary: `word nature frequency`.
pub const CORE_DICTIONARY: &str = "\
我 r 5000
在 p 5000
的 ude1 20000
了 ule 8000
来 v 3000
是 vshi 10000
中国 ns 2000
人民 n 1800
中国人 n 50
民 n 40
中华 nz 300
共和 n 20
共和国 n 150
中华人民共和国 ns 100
银行 nt 600
大学 n 900
北京 ns 1500
欢迎 v 700
你 r 4000
区 n 200
攻 v 30
城 n 120
";

/// Bigram frequencies: `left@right frequency`.
pub const BIGRAM_DICTIONARY: &str = "\
中国@人民 20
人民@银行 15
我@在 30
";

/// Custom dictionary: `word [nature frequency]`.
pub const CUSTOM_DICTIONARY: &str = "\
攻城狮 nz 10
欢迎你 vl 5
";

/// Stop words, one per line.
pub const STOP_WORDS: &str = "的\n了\n是\n";

const SEGMENTER_LABELS: [&str; 4] = ["B", "M", "E", "S"];

/// Characters the fixture segmenters know, with their `B/M/E/S` label.
const CHARACTER_LABELS: &[(&str, &str)] = &[
    ("北", "B"),
    ("京", "E"),
    ("大", "B"),
    ("学", "E"),
    ("欢", "B"),
    ("迎", "E"),
    ("你", "S"),
    ("我", "S"),
    ("在", "S"),
];

const POS_LABELS: [&str; 5] = ["n", "ns", "v", "r", "p"];

const WORD_NATURES: &[(&str, &str)] = &[
    ("北京", "ns"),
    ("大学", "n"),
    ("欢迎", "v"),
    ("你", "r"),
    ("我", "r"),
    ("在", "p"),
];

const NER_LABELS: [&str; 4] = ["O", "B-nt", "E-nt", "S-ns"];

const WORD_ENTITIES: &[(&str, &str)] = &[("北京", "B-nt"), ("大学", "E-nt")];

/// Weights that select `label` among `labels`.
fn one_hot(labels: &[&str], label: &str) -> Vec<f32> {
    labels
        .iter()
        .map(|l| if *l == label { 1.0 } else { 0.0 })
        .collect()
}

fn linear_model(
    labels: &[&str],
    templates: &[&str],
    feature_prefix: &str,
    rows: &[(&str, &str)],
) -> LinearModel {
    let weights: AHashMap<String, Vec<f32>> = rows
        .iter()
        .map(|(cell, label)| (format!("{feature_prefix}{cell}"), one_hot(labels, label)))
        .collect();
    LinearModel {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        templates: templates.iter().map(|s| s.to_string()).collect(),
        transitions: Vec::new(),
        weights,
    }
}

/// CRF segmentation model: segments 北京大学欢迎你 as 北京/大学/欢迎/你.
pub fn crf_cws_model() -> LinearModel {
    linear_model(&SEGMENTER_LABELS, &["U0:%x[0,0]"], "U0:", CHARACTER_LABELS)
}

/// CRF part-of-speech model.
pub fn crf_pos_model() -> LinearModel {
    linear_model(&POS_LABELS, &["U0:%x[0,0]"], "U0:", WORD_NATURES)
}

/// CRF named entity model: 北京 + 大学 is an organization.
pub fn crf_ner_model() -> LinearModel {
    linear_model(&NER_LABELS, &["U0:%x[0,0]"], "U0:", WORD_ENTITIES)
}

/// Perceptron segmentation model (default templates).
pub fn perceptron_cws_model() -> LinearModel {
    linear_model(&SEGMENTER_LABELS, &[], "U2:", CHARACTER_LABELS)
}

/// Perceptron part-of-speech model (default templates).
pub fn perceptron_pos_model() -> LinearModel {
    linear_model(&POS_LABELS, &[], "U1:", WORD_NATURES)
}

/// Perceptron named entity model (default templates).
pub fn perceptron_ner_model() -> LinearModel {
    linear_model(&NER_LABELS, &[], "U1:", WORD_ENTITIES)
}

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_file<P: AsRef<Path>>(root: P, relative: &str, contents: &str) -> Result<PathBuf> {
    let path = root.as_ref().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// Write every fixture model under `root` at its default relative path.
pub fn write_models<P: AsRef<Path>>(root: P) -> Result<()> {
    let root = root.as_ref();
    write_file(root, DEFAULT_CORE_DICTIONARY_PATH, CORE_DICTIONARY)?;
    write_file(root, DEFAULT_BIGRAM_DICTIONARY_PATH, BIGRAM_DICTIONARY)?;
    write_file(root, DEFAULT_CUSTOM_DICTIONARY_PATH, CUSTOM_DICTIONARY)?;
    write_file(root, DEFAULT_STOP_WORDS_PATH, STOP_WORDS)?;

    let models = [
        (DEFAULT_PERCEPTRON_CWS_PATH, perceptron_cws_model()),
        (DEFAULT_PERCEPTRON_POS_PATH, perceptron_pos_model()),
        (DEFAULT_PERCEPTRON_NER_PATH, perceptron_ner_model()),
        (DEFAULT_CRF_CWS_PATH, crf_cws_model()),
        (DEFAULT_CRF_POS_PATH, crf_pos_model()),
        (DEFAULT_CRF_NER_PATH, crf_ner_model()),
    ];
    for (relative, model) in models {
        write_file(root, relative, &model.to_json()?)?;
    }
    Ok(())
}

/// Remove the file at `root/relative`.
pub fn remove_file<P: AsRef<Path>>(root: P, relative: &str) -> Result<()> {
    fs::remove_file(root.as_ref().join(relative))?;
    Ok(())
}
