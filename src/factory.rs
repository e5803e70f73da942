//! Strategy selection: from a declared tokenizer type to a built engine.
//!
//! A [`TokenizerFactory`] is bound to one [`StrategyKind`] and one
//! [`Configuration`] when it is created. Every call to
//! [`TokenizerFactory::create`] builds a fresh [`HanlpTokenizer`] whose engine
//! shares its models, through the [`ModelRegistry`], with every other engine
//! in the process.
//!
//! Some strategies enforce a fixed policy on top of the configuration:
//!
//! | kind | engine | enforced |
//! |---|---|---|
//! | `hanlp`, `hanlp_standard` | Viterbi lattice | - |
//! | `hanlp_index` | Viterbi lattice | index mode on |
//! | `hanlp_speed` | longest match | custom dictionary off |
//! | `hanlp_dijkstra` | Dijkstra lattice | custom dictionary off, place and organization recognition on |
//! | `hanlp_n_short` | N-shortest lattice | custom dictionary off, place and organization recognition on |
//! | `hanlp_nlp` | perceptron composite | - |
//! | `hanlp_crf` | CRF composite | - |
//!
//! # Examples
//!
//! ```
//! use hanseg::analysis::tokenizer::Tokenizer;
//! use hanseg::factory::TokenizerFactory;
//! use hanseg::settings::{Environment, Settings};
//!
//! let dir = tempfile::tempdir().unwrap();
//! hanseg::testing::write_models(dir.path()).unwrap();
//! let env = Environment::with_root(dir.path());
//!
//! let factory = TokenizerFactory::from_name("hanlp_index", &env, &Settings::new()).unwrap();
//! let tokenizer = factory.create().unwrap();
//!
//! let tokens: Vec<_> = tokenizer.tokenize("中华人民共和国").unwrap().collect();
//! assert_eq!(tokens[0].text, "中华人民共和国");
//! assert!(tokens[1..].iter().all(|t| t.position_increment == 0));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::hanlp::HanlpTokenizer;
use crate::configuration::Configuration;
use crate::error::{HansegError, Result};
use crate::isolation::{Grant, run_isolated};
use crate::model::{BigramTable, Lexicon, ModelKey, ModelKind, ModelRegistry, StopWords};
use crate::segment::dictionary::DictionarySegment;
use crate::segment::lattice::{DEFAULT_PATH_COUNT, Dictionaries, LatticeSegment, PathAlgorithm};
use crate::segment::lexical::{CompositeLevel, CompositeModels, LexicalSegment};
use crate::segment::{Segment, Term};
use crate::settings::{Environment, Settings};

use self::resolver::Resolution;

pub mod resolver;

/// The segmentation strategies a host can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// `hanlp`: the general-purpose lattice engine.
    Default,
    /// `hanlp_standard`: same engine as `hanlp`.
    Standard,
    /// `hanlp_index`: lattice engine with index-mode sub-words.
    IndexMode,
    /// `hanlp_nlp`: perceptron segmentation, part of speech and entities.
    PerceptronComposite,
    /// `hanlp_crf`: CRF segmentation with optional part of speech and entities.
    CrfComposite,
    /// `hanlp_n_short`: name recognition over the N shortest paths.
    NShortPath,
    /// `hanlp_dijkstra`: Dijkstra shortest path.
    ShortestPath,
    /// `hanlp_speed`: forward longest match over the core dictionary.
    DictionaryTrie,
}

impl StrategyKind {
    /// Every kind, in declaration order.
    pub const ALL: [StrategyKind; 8] = [
        StrategyKind::Default,
        StrategyKind::Standard,
        StrategyKind::IndexMode,
        StrategyKind::PerceptronComposite,
        StrategyKind::CrfComposite,
        StrategyKind::NShortPath,
        StrategyKind::ShortestPath,
        StrategyKind::DictionaryTrie,
    ];

    /// The tokenizer type name hosts declare.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Default => "hanlp",
            StrategyKind::Standard => "hanlp_standard",
            StrategyKind::IndexMode => "hanlp_index",
            StrategyKind::PerceptronComposite => "hanlp_nlp",
            StrategyKind::CrfComposite => "hanlp_crf",
            StrategyKind::NShortPath => "hanlp_n_short",
            StrategyKind::ShortestPath => "hanlp_dijkstra",
            StrategyKind::DictionaryTrie => "hanlp_speed",
        }
    }

    /// One-line description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Default => "lattice segmentation with bigram costs (Viterbi)",
            StrategyKind::Standard => "same as hanlp",
            StrategyKind::IndexMode => "lattice segmentation emitting overlapping sub-words",
            StrategyKind::PerceptronComposite => {
                "perceptron segmentation, part of speech and named entities"
            }
            StrategyKind::CrfComposite => {
                "CRF segmentation, degrading when optional models are missing"
            }
            StrategyKind::NShortPath => "name recognition over the N shortest paths",
            StrategyKind::ShortestPath => "Dijkstra shortest path with name recognition",
            StrategyKind::DictionaryTrie => "forward longest match over the core dictionary",
        }
    }

    /// The configuration this kind runs with, given the declared one.
    ///
    /// # Examples
    ///
    /// ```
    /// use hanseg::configuration::Configuration;
    /// use hanseg::factory::StrategyKind;
    ///
    /// let declared = Configuration::with_root("/opt/hanlp");
    /// let effective = StrategyKind::ShortestPath.effective_configuration(&declared);
    ///
    /// assert!(!effective.custom_dictionary);
    /// assert!(effective.place_recognize && effective.organization_recognize);
    /// assert!(declared.custom_dictionary);
    /// ```
    pub fn effective_configuration(&self, config: &Configuration) -> Configuration {
        let config = config.clone();
        match self {
            StrategyKind::Default
            | StrategyKind::Standard
            | StrategyKind::PerceptronComposite
            | StrategyKind::CrfComposite => config,
            StrategyKind::IndexMode => config.enable_index_mode(true),
            StrategyKind::DictionaryTrie => config.enable_custom_dictionary(false),
            StrategyKind::NShortPath | StrategyKind::ShortestPath => config
                .enable_custom_dictionary(false)
                .enable_place_recognize(true)
                .enable_organization_recognize(true),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = HansegError;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = StrategyKind::ALL.iter().map(|k| k.name()).collect();
                HansegError::configuration(format!(
                    "unknown tokenizer type '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// A built engine, ready to segment from any thread.
#[derive(Clone, Debug)]
pub struct SegmentationEngine {
    kind: StrategyKind,
    segment: Arc<dyn Segment>,
    resolution: Option<Resolution>,
}

impl SegmentationEngine {
    /// Wrap an engine built for `kind`.
    pub fn new(kind: StrategyKind, segment: Arc<dyn Segment>) -> Self {
        SegmentationEngine {
            kind,
            segment,
            resolution: None,
        }
    }

    /// The strategy this engine implements.
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// How the stages of a CRF composite were chosen.
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Stages of a composite engine.
    pub fn level(&self) -> Option<CompositeLevel> {
        match self.kind {
            StrategyKind::PerceptronComposite => Some(CompositeLevel::Full),
            StrategyKind::CrfComposite => self.resolution.as_ref().map(|r| r.level),
            _ => None,
        }
    }

    /// Segment `text`.
    pub fn segment(&self, text: &str) -> Vec<Term> {
        self.segment.segment(text)
    }
}

/// Keep going without an optional model, unless the failure is a violation.
fn optional<T>(kind: ModelKind, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_isolation_violation() => Err(err),
        Err(err) => {
            warn!("Continuing without {kind}: {err}");
            Ok(None)
        }
    }
}

fn core_lexicon(
    config: &Configuration,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<Arc<Lexicon>> {
    let key = ModelKey::new(ModelKind::CoreDictionary, &config.paths.core_dictionary);
    registry.lexicon(&key, grant)
}

fn bigram_table(
    config: &Configuration,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<Option<Arc<BigramTable>>> {
    let key = ModelKey::new(ModelKind::BigramDictionary, &config.paths.bigram_dictionary);
    optional(ModelKind::BigramDictionary, registry.bigram(&key, grant))
}

/// Load every configured custom dictionary that is available and merge
/// them, earlier files taking precedence.
fn custom_lexicon(
    config: &Configuration,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<Option<Arc<Lexicon>>> {
    if !config.custom_dictionary {
        return Ok(None);
    }
    let mut loaded = Vec::new();
    for path in &config.paths.custom_dictionaries {
        let key = ModelKey::new(ModelKind::CustomDictionary, path);
        if let Some(lexicon) = optional(ModelKind::CustomDictionary, registry.lexicon(&key, grant))? {
            loaded.push(lexicon);
        }
    }
    Ok(match loaded.len() {
        0 => None,
        1 => loaded.pop(),
        _ => Some(Arc::new(Lexicon::merge(&loaded))),
    })
}

fn warn_ignored_recognition(kind: StrategyKind, config: &Configuration) {
    if config.recognizes_entities() {
        warn!("{kind} ignores enable_place_recognize and enable_organization_recognize");
    }
}

fn lattice(
    kind: StrategyKind,
    algorithm: PathAlgorithm,
    config: &Configuration,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<LatticeSegment> {
    let dictionaries = Dictionaries {
        core: core_lexicon(config, grant, registry)?,
        custom: custom_lexicon(config, grant, registry)?,
        bigram: bigram_table(config, grant, registry)?,
    };
    Ok(LatticeSegment::new(kind.name(), algorithm, dictionaries, config))
}

fn composite(
    kind: StrategyKind,
    models: CompositeModels,
    config: &Configuration,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<LexicalSegment> {
    warn_ignored_recognition(kind, config);
    let index_lexicon = if config.index_mode {
        optional(
            ModelKind::CoreDictionary,
            core_lexicon(config, grant, registry),
        )?
    } else {
        None
    };
    let custom = custom_lexicon(config, grant, registry)?;
    Ok(LexicalSegment::new(
        kind.name(),
        models,
        custom,
        index_lexicon,
        config,
    ))
}

/// Build the engine for `kind`.
///
/// The declared configuration is first adjusted to the policy of `kind`
/// (see [`StrategyKind::effective_configuration`]). All model loading runs
/// through `registry`, limited to the directories of `grant`; any failure is
/// attributed to the strategy.
pub fn build(
    kind: StrategyKind,
    config: &Configuration,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<SegmentationEngine> {
    let config = kind.effective_configuration(config);
    run_isolated(kind.name(), grant, |_scope| {
        config.validate()?;
        let started = Instant::now();

        let mut resolution = None;
        let segment: Arc<dyn Segment> = match kind {
            StrategyKind::Default | StrategyKind::Standard | StrategyKind::IndexMode => Arc::new(
                lattice(kind, PathAlgorithm::Viterbi, &config, grant, registry)?,
            ),
            StrategyKind::ShortestPath => Arc::new(lattice(
                kind,
                PathAlgorithm::Dijkstra,
                &config,
                grant,
                registry,
            )?),
            StrategyKind::NShortPath => Arc::new(lattice(
                kind,
                PathAlgorithm::NShortest(DEFAULT_PATH_COUNT),
                &config,
                grant,
                registry,
            )?),
            StrategyKind::DictionaryTrie => {
                warn_ignored_recognition(kind, &config);
                let core = core_lexicon(&config, grant, registry)?;
                Arc::new(DictionarySegment::new(kind.name(), core, &config))
            }
            StrategyKind::PerceptronComposite => {
                let models = resolver::resolve_perceptron(&config.paths, grant, registry)?;
                Arc::new(composite(kind, models, &config, grant, registry)?)
            }
            StrategyKind::CrfComposite => {
                let resolved = resolver::resolve_crf(&config.paths, grant, registry)?;
                resolution = Some(resolved.resolution);
                Arc::new(composite(kind, resolved.models, &config, grant, registry)?)
            }
        };

        info!("Built {kind} engine in {:?}", started.elapsed());
        Ok(SegmentationEngine {
            kind,
            segment,
            resolution,
        })
    })
}

/// Creates tokenizers of one declared kind.
#[derive(Clone, Debug)]
pub struct TokenizerFactory {
    kind: StrategyKind,
    configuration: Configuration,
    grant: Grant,
    registry: Arc<ModelRegistry>,
}

impl TokenizerFactory {
    /// Parse `settings` for a tokenizer of `kind`.
    ///
    /// Construction may read below the environment's config directory and
    /// model root, and nowhere else.
    pub fn new(kind: StrategyKind, env: &Environment, settings: &Settings) -> Result<Self> {
        let configuration = Configuration::from_settings(env, settings)?;
        Ok(TokenizerFactory {
            kind,
            configuration,
            grant: Grant::new([env.config_dir(), env.model_root()]),
            registry: ModelRegistry::global(),
        })
    }

    /// Like [`TokenizerFactory::new`], with the kind given by its type name.
    pub fn from_name(name: &str, env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(name.parse()?, env, settings)
    }

    /// `hanlp`
    pub fn hanlp(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::Default, env, settings)
    }

    /// `hanlp_standard`
    pub fn standard(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::Standard, env, settings)
    }

    /// `hanlp_index`
    pub fn index(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::IndexMode, env, settings)
    }

    /// `hanlp_nlp`
    pub fn nlp(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::PerceptronComposite, env, settings)
    }

    /// `hanlp_crf`
    pub fn crf(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::CrfComposite, env, settings)
    }

    /// `hanlp_n_short`
    pub fn n_short(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::NShortPath, env, settings)
    }

    /// `hanlp_dijkstra`
    pub fn dijkstra(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::ShortestPath, env, settings)
    }

    /// `hanlp_speed`
    pub fn speed(env: &Environment, settings: &Settings) -> Result<Self> {
        TokenizerFactory::new(StrategyKind::DictionaryTrie, env, settings)
    }

    /// Use `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<ModelRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The declared kind.
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// The configuration parsed from the settings.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// The configuration engines of this kind run with.
    pub fn effective_configuration(&self) -> Configuration {
        self.kind.effective_configuration(&self.configuration)
    }

    /// The registry models are loaded through.
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Build the engine without wrapping it in a tokenizer.
    pub fn build_engine(&self) -> Result<SegmentationEngine> {
        build(self.kind, &self.configuration, &self.grant, &self.registry)
    }

    fn stop_words(&self) -> Result<Option<Arc<StopWords>>> {
        if !self.configuration.stop_dictionary {
            return Ok(None);
        }
        let key = ModelKey::new(ModelKind::StopWords, &self.configuration.paths.stop_words);
        run_isolated(self.kind.name(), &self.grant, |_scope| {
            optional(
                ModelKind::StopWords,
                self.registry.stop_words(&key, &self.grant),
            )
        })
    }

    /// Create a tokenizer.
    pub fn create(&self) -> Result<HanlpTokenizer> {
        let engine = self.build_engine()?;
        let mut tokenizer = HanlpTokenizer::new(engine)
            .with_part_of_speech(self.configuration.part_of_speech_tagging);
        if let Some(words) = self.stop_words()? {
            tokenizer = tokenizer.with_stop_filter(StopFilter::new(words));
        }
        Ok(tokenizer)
    }

    /// Create an analyzer around a new tokenizer.
    pub fn create_analyzer(&self) -> Result<PipelineAnalyzer> {
        Ok(PipelineAnalyzer::new(Arc::new(self.create()?)).with_name(self.kind.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_models;
    use tempfile::tempdir;

    fn factory(kind: StrategyKind, root: &std::path::Path, settings: &Settings) -> TokenizerFactory {
        TokenizerFactory::new(kind, &Environment::with_root(root), settings)
            .unwrap()
            .with_registry(Arc::new(ModelRegistry::new()))
    }

    fn texts(engine: &SegmentationEngine, text: &str) -> Vec<String> {
        engine.segment(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn test_unknown_kind_is_configuration_error() {
        let err = "hanlp_fast".parse::<StrategyKind>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("hanlp_speed"));

        let env = Environment::with_root("/unused");
        let err = TokenizerFactory::from_name("ik_smart", &env, &Settings::new()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_effective_configuration() {
        let declared = Configuration::with_root("/unused").enable_place_recognize(true);

        let index = StrategyKind::IndexMode.effective_configuration(&declared);
        assert!(index.index_mode);
        assert!(index.place_recognize);

        let speed = StrategyKind::DictionaryTrie.effective_configuration(&declared);
        assert!(!speed.custom_dictionary);

        let standard = StrategyKind::Standard.effective_configuration(&declared);
        assert_eq!(standard, declared);

        for kind in [StrategyKind::NShortPath, StrategyKind::ShortestPath] {
            let config = kind.effective_configuration(&declared);
            assert!(!config.custom_dictionary);
            assert!(config.place_recognize);
            assert!(config.organization_recognize);
        }
    }

    #[test]
    fn test_every_kind_builds() {
        let dir = tempdir().unwrap();
        write_models(dir.path()).unwrap();

        for kind in StrategyKind::ALL {
            let engine = factory(kind, dir.path(), &Settings::new())
                .build_engine()
                .unwrap();
            assert_eq!(engine.kind(), kind);
            assert!(!engine.segment("我在北京").is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_speed_ignores_custom_dictionary() {
        let dir = tempdir().unwrap();
        write_models(dir.path()).unwrap();

        let standard = factory(StrategyKind::Standard, dir.path(), &Settings::new())
            .build_engine()
            .unwrap();
        assert_eq!(texts(&standard, "攻城狮"), vec!["攻城狮"]);

        let speed = factory(StrategyKind::DictionaryTrie, dir.path(), &Settings::new())
            .build_engine()
            .unwrap();
        assert_eq!(texts(&speed, "攻城狮"), vec!["攻", "城", "狮"]);
    }

    #[test]
    fn test_missing_optional_dictionaries_do_not_fail() {
        let dir = tempdir().unwrap();
        write_models(dir.path()).unwrap();
        let settings = Settings::from_pairs([
            ("custom_dictionary_path", "missing.txt"),
            ("bigram_dictionary_path", "missing.ngram.txt"),
        ]);

        let engine = factory(StrategyKind::Default, dir.path(), &settings)
            .build_engine()
            .unwrap();
        assert_eq!(texts(&engine, "中国人民"), vec!["中国", "人民"]);
    }

    #[test]
    fn test_missing_core_dictionary_names_the_strategy() {
        let dir = tempdir().unwrap();
        let err = factory(StrategyKind::ShortestPath, dir.path(), &Settings::new())
            .build_engine()
            .unwrap_err();

        assert!(err.is_model_unavailable());
        assert_eq!(err.subjects(), vec!["hanlp_dijkstra"]);
    }

    #[test]
    fn test_crf_reports_resolution() {
        let dir = tempdir().unwrap();
        write_models(dir.path()).unwrap();
        let settings = Settings::from_pairs([("crf_ner_model_path", "")]);

        let engine = factory(StrategyKind::CrfComposite, dir.path(), &settings)
            .build_engine()
            .unwrap();
        assert_eq!(engine.level(), Some(CompositeLevel::SegmenterPos));
        assert_eq!(
            engine.resolution().map(|r| r.ner.clone()),
            Some(resolver::Availability::NotConfigured)
        );
    }

    #[test]
    fn test_create_applies_stop_words_and_part_of_speech() {
        use crate::analysis::tokenizer::Tokenizer;

        let dir = tempdir().unwrap();
        write_models(dir.path()).unwrap();
        let settings = Settings::from_pairs([
            ("enable_stop_dictionary", "true"),
            ("enable_part_of_speech_tagging", "true"),
        ]);

        let tokenizer = factory(StrategyKind::Default, dir.path(), &settings)
            .create()
            .unwrap();
        let tokens: Vec<_> = tokenizer.tokenize("我的中国").unwrap().collect();

        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["我", "中国"]);
        assert_eq!(tokens[1].attribute("pos"), Some("ns"));
    }
}
