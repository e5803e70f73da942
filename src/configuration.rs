//! Tokenizer configuration.
//!
//! A [`Configuration`] is parsed once from host [`Settings`] when a factory is
//! created. Strategies that enforce a fixed policy (for example the graph
//! engines, which always recognize places and organizations) derive a new
//! configuration with the fluent `enable_*` methods; the factory's own copy
//! is never mutated afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HansegError, Result};
use crate::settings::{Environment, Settings};

/// Default location of the core dictionary, relative to the model root.
pub const DEFAULT_CORE_DICTIONARY_PATH: &str = "data/dictionary/CoreNatureDictionary.txt";
/// Default location of the bigram dictionary.
pub const DEFAULT_BIGRAM_DICTIONARY_PATH: &str = "data/dictionary/CoreNatureDictionary.ngram.txt";
/// Default location of the custom dictionary.
pub const DEFAULT_CUSTOM_DICTIONARY_PATH: &str = "data/dictionary/custom/CustomDictionary.txt";
/// Default location of the stop word list.
pub const DEFAULT_STOP_WORDS_PATH: &str = "data/dictionary/stopwords.txt";
/// Default perceptron word segmentation model.
pub const DEFAULT_PERCEPTRON_CWS_PATH: &str = "data/model/perceptron/cws.json";
/// Default perceptron part-of-speech model.
pub const DEFAULT_PERCEPTRON_POS_PATH: &str = "data/model/perceptron/pos.json";
/// Default perceptron named entity model.
pub const DEFAULT_PERCEPTRON_NER_PATH: &str = "data/model/perceptron/ner.json";
/// Default CRF word segmentation model.
pub const DEFAULT_CRF_CWS_PATH: &str = "data/model/crf/cws.json";
/// Default CRF part-of-speech model.
pub const DEFAULT_CRF_POS_PATH: &str = "data/model/crf/pos.json";
/// Default CRF named entity model.
pub const DEFAULT_CRF_NER_PATH: &str = "data/model/crf/ner.json";

/// Resolved locations of every model a strategy may need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPaths {
    /// Directory relative paths were resolved against.
    pub root: PathBuf,
    /// Core dictionary (words, natures, frequencies).
    pub core_dictionary: PathBuf,
    /// Word bigram frequencies.
    pub bigram_dictionary: PathBuf,
    /// Custom dictionaries, merged in order.
    pub custom_dictionaries: Vec<PathBuf>,
    /// Stop word list.
    pub stop_words: PathBuf,
    /// Perceptron segmentation model.
    pub perceptron_cws: PathBuf,
    /// Perceptron part-of-speech model.
    pub perceptron_pos: PathBuf,
    /// Perceptron named entity model.
    pub perceptron_ner: PathBuf,
    /// CRF segmentation model.
    pub crf_cws: PathBuf,
    /// CRF part-of-speech model; `None` when explicitly not configured.
    pub crf_pos: Option<PathBuf>,
    /// CRF named entity model; `None` when explicitly not configured.
    pub crf_ner: Option<PathBuf>,
}

impl ModelPaths {
    /// Default paths under `root`.
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        ModelPaths {
            root: root.to_path_buf(),
            core_dictionary: root.join(DEFAULT_CORE_DICTIONARY_PATH),
            bigram_dictionary: root.join(DEFAULT_BIGRAM_DICTIONARY_PATH),
            custom_dictionaries: vec![root.join(DEFAULT_CUSTOM_DICTIONARY_PATH)],
            stop_words: root.join(DEFAULT_STOP_WORDS_PATH),
            perceptron_cws: root.join(DEFAULT_PERCEPTRON_CWS_PATH),
            perceptron_pos: root.join(DEFAULT_PERCEPTRON_POS_PATH),
            perceptron_ner: root.join(DEFAULT_PERCEPTRON_NER_PATH),
            crf_cws: root.join(DEFAULT_CRF_CWS_PATH),
            crf_pos: Some(root.join(DEFAULT_CRF_POS_PATH)),
            crf_ner: Some(root.join(DEFAULT_CRF_NER_PATH)),
        }
    }

    fn from_settings(env: &Environment, settings: &Settings) -> Self {
        let root = match settings.get("model_root") {
            Some(raw) => resolve(env.config_dir(), raw),
            None => env.model_root().to_path_buf(),
        };
        let path = |key: &str, default: &str| resolve(&root, settings.get(key).unwrap_or(default));
        // An empty value switches an optional model off.
        let optional = |key: &str, default: &str| match settings.get(key).map(str::trim) {
            Some("") => None,
            raw => Some(resolve(&root, raw.unwrap_or(default))),
        };

        let custom_dictionaries = settings
            .get("custom_dictionary_path")
            .unwrap_or(DEFAULT_CUSTOM_DICTIONARY_PATH)
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| resolve(&root, p))
            .collect();

        ModelPaths {
            core_dictionary: path("core_dictionary_path", DEFAULT_CORE_DICTIONARY_PATH),
            bigram_dictionary: path("bigram_dictionary_path", DEFAULT_BIGRAM_DICTIONARY_PATH),
            custom_dictionaries,
            stop_words: path("stop_words_path", DEFAULT_STOP_WORDS_PATH),
            perceptron_cws: path("perceptron_cws_model_path", DEFAULT_PERCEPTRON_CWS_PATH),
            perceptron_pos: path("perceptron_pos_model_path", DEFAULT_PERCEPTRON_POS_PATH),
            perceptron_ner: path("perceptron_ner_model_path", DEFAULT_PERCEPTRON_NER_PATH),
            crf_cws: path("crf_cws_model_path", DEFAULT_CRF_CWS_PATH),
            crf_pos: optional("crf_pos_model_path", DEFAULT_CRF_POS_PATH),
            crf_ner: optional("crf_ner_model_path", DEFAULT_CRF_NER_PATH),
            root,
        }
    }
}

fn resolve(base: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Behavioral toggles and model locations for one tokenizer factory.
///
/// # Examples
///
/// ```
/// use hanseg::configuration::Configuration;
/// use hanseg::settings::{Environment, Settings};
///
/// let env = Environment::with_root("/opt/hanlp");
/// let settings = Settings::from_pairs([("enable_place_recognize", "true")]);
/// let config = Configuration::from_settings(&env, &settings).unwrap();
///
/// assert!(config.place_recognize);
/// assert!(config.custom_dictionary);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Emit overlapping sub-words of long terms.
    pub index_mode: bool,

    /// Use the custom dictionary while segmenting.
    pub custom_dictionary: bool,

    /// Let the custom dictionary override the statistically best path.
    pub custom_dictionary_forcing: bool,

    /// Recognize place names (graph engines).
    pub place_recognize: bool,

    /// Recognize organization names (graph engines).
    pub organization_recognize: bool,

    /// Merge numerals with a following quantifier.
    pub number_quantifier_recognize: bool,

    /// Drop stop words from the token stream.
    pub stop_dictionary: bool,

    /// Fold full-width characters and upper case before segmenting.
    pub normalization: bool,

    /// Attach part-of-speech natures to tokens.
    pub part_of_speech_tagging: bool,

    /// Only terms longer than this (in chars) are expanded in index mode.
    pub min_index_word_length: usize,

    /// Model locations.
    pub paths: ModelPaths,
}

impl Configuration {
    /// Default configuration with models under `root`.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Configuration {
            index_mode: false,
            custom_dictionary: true,
            custom_dictionary_forcing: false,
            place_recognize: false,
            organization_recognize: false,
            number_quantifier_recognize: false,
            stop_dictionary: false,
            normalization: false,
            part_of_speech_tagging: false,
            min_index_word_length: 2,
            paths: ModelPaths::under(root),
        }
    }

    /// Parse and validate a configuration from host settings.
    pub fn from_settings(env: &Environment, settings: &Settings) -> Result<Self> {
        let defaults = Configuration::with_root(env.model_root());
        let config = Configuration {
            index_mode: settings.get_bool("enable_index_mode", defaults.index_mode)?,
            custom_dictionary: settings
                .get_bool("enable_custom_dictionary", defaults.custom_dictionary)?,
            custom_dictionary_forcing: settings.get_bool(
                "enable_custom_dictionary_forcing",
                defaults.custom_dictionary_forcing,
            )?,
            place_recognize: settings.get_bool("enable_place_recognize", defaults.place_recognize)?,
            organization_recognize: settings.get_bool(
                "enable_organization_recognize",
                defaults.organization_recognize,
            )?,
            number_quantifier_recognize: settings.get_bool(
                "enable_number_quantifier_recognize",
                defaults.number_quantifier_recognize,
            )?,
            stop_dictionary: settings.get_bool("enable_stop_dictionary", defaults.stop_dictionary)?,
            normalization: settings.get_bool("enable_normalization", defaults.normalization)?,
            part_of_speech_tagging: settings.get_bool(
                "enable_part_of_speech_tagging",
                defaults.part_of_speech_tagging,
            )?,
            min_index_word_length: settings
                .get_usize("min_index_word_length", defaults.min_index_word_length)?,
            paths: ModelPaths::from_settings(env, settings),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject toggle combinations that cannot be honored.
    pub fn validate(&self) -> Result<()> {
        if self.custom_dictionary_forcing && !self.custom_dictionary {
            return Err(HansegError::configuration(
                "enable_custom_dictionary_forcing requires enable_custom_dictionary",
            ));
        }
        if self.min_index_word_length == 0 {
            return Err(HansegError::configuration(
                "min_index_word_length must be at least 1",
            ));
        }
        Ok(())
    }

    /// Set index mode.
    pub fn enable_index_mode(mut self, enable: bool) -> Self {
        self.index_mode = enable;
        self
    }

    /// Set custom dictionary use. Disabling it also disables forcing.
    pub fn enable_custom_dictionary(mut self, enable: bool) -> Self {
        self.custom_dictionary = enable;
        if !enable {
            self.custom_dictionary_forcing = false;
        }
        self
    }

    /// Set place name recognition.
    pub fn enable_place_recognize(mut self, enable: bool) -> Self {
        self.place_recognize = enable;
        self
    }

    /// Set organization name recognition.
    pub fn enable_organization_recognize(mut self, enable: bool) -> Self {
        self.organization_recognize = enable;
        self
    }

    /// Whether any entity recognizer is on.
    pub fn recognizes_entities(&self) -> bool {
        self.place_recognize || self.organization_recognize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::new("/etc/host", "/opt/hanlp")
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::from_settings(&env(), &Settings::new()).unwrap();

        assert!(!config.index_mode);
        assert!(config.custom_dictionary);
        assert!(!config.place_recognize);
        assert_eq!(config.min_index_word_length, 2);
        assert_eq!(
            config.paths.core_dictionary,
            PathBuf::from("/opt/hanlp").join(DEFAULT_CORE_DICTIONARY_PATH)
        );
    }

    #[test]
    fn test_paths_resolve_against_model_root() {
        let settings = Settings::from_pairs([
            ("model_root", "models"),
            ("core_dictionary_path", "core.txt"),
            ("crf_cws_model_path", "/abs/cws.json"),
            ("custom_dictionary_path", "a.txt; b.txt;"),
        ]);
        let config = Configuration::from_settings(&env(), &settings).unwrap();

        assert_eq!(config.paths.root, PathBuf::from("/etc/host/models"));
        assert_eq!(
            config.paths.core_dictionary,
            PathBuf::from("/etc/host/models/core.txt")
        );
        assert_eq!(config.paths.crf_cws, PathBuf::from("/abs/cws.json"));
        assert_eq!(
            config.paths.custom_dictionaries,
            vec![
                PathBuf::from("/etc/host/models/a.txt"),
                PathBuf::from("/etc/host/models/b.txt")
            ]
        );
    }

    #[test]
    fn test_empty_optional_model_path_is_not_configured() {
        let settings = Settings::from_pairs([("crf_ner_model_path", "")]);
        let config = Configuration::from_settings(&env(), &settings).unwrap();

        assert!(config.paths.crf_pos.is_some());
        assert_eq!(config.paths.crf_ner, None);
    }

    #[test]
    fn test_forcing_without_custom_dictionary_is_rejected() {
        let settings = Settings::from_pairs([
            ("enable_custom_dictionary", "false"),
            ("enable_custom_dictionary_forcing", "true"),
        ]);
        let err = Configuration::from_settings(&env(), &settings).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_fluent_toggles() {
        let config = Configuration::with_root("/opt/hanlp")
            .enable_custom_dictionary(false)
            .enable_place_recognize(true)
            .enable_organization_recognize(true);

        assert!(!config.custom_dictionary);
        assert!(config.recognizes_entities());
    }
}
