//! Command implementations for the hanseg CLI.

use std::env;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Instant;

use log::debug;

use crate::analysis::tokenizer::Tokenizer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::configuration::Configuration;
use crate::error::{HansegError, Result};
use crate::factory::{StrategyKind, TokenizerFactory};
use crate::model::{ModelKey, ModelKind, ModelState};
use crate::settings::{Environment, Settings};

/// Execute a CLI command.
pub fn execute_command(args: HansegArgs) -> Result<()> {
    match &args.command {
        Command::Segment(segment_args) => segment(segment_args, &args),
        Command::Inspect(tokenizer_args) => inspect(tokenizer_args, &args),
        Command::Kinds => list_kinds(&args),
    }
}

/// Read the settings file and apply `--set` overrides.
fn load_settings(args: &TokenizerArgs) -> Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            Settings::from_json_str(&fs::read_to_string(path)?)?
        }
        None => Settings::new(),
    };
    for pair in &args.overrides {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            HansegError::configuration(format!("expected KEY=VALUE, got '{pair}'"))
        })?;
        settings = settings.with(key.trim(), value.trim());
    }
    Ok(settings)
}

fn environment(args: &TokenizerArgs) -> Result<Environment> {
    let config_dir = match (&args.config_dir, &args.settings) {
        (Some(dir), _) => dir.clone(),
        (None, Some(file)) => file
            .parent()
            .map(PathBuf::from)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(env::current_dir()?),
        (None, None) => env::current_dir()?,
    };
    let model_root = args.model_root.clone().unwrap_or_else(|| config_dir.clone());
    Ok(Environment::new(config_dir, model_root))
}

fn factory(args: &TokenizerArgs) -> Result<TokenizerFactory> {
    let settings = load_settings(args)?;
    let env = environment(args)?;
    TokenizerFactory::from_name(&args.kind, &env, &settings)
}

/// Segment each text argument, or each stdin line.
fn segment(args: &SegmentArgs, cli_args: &HansegArgs) -> Result<()> {
    let factory = factory(&args.tokenizer)?;
    let tokenizer = factory.create()?;

    let texts: Vec<String> = if args.text.is_empty() {
        io::stdin().lock().lines().collect::<io::Result<_>>()?
    } else {
        args.text.clone()
    };

    for text in texts {
        let started = Instant::now();
        let tokens = tokenizer
            .tokenize(&text)?
            .map(TokenOutput::from)
            .collect();
        let result = SegmentationResult {
            kind: tokenizer.name().to_string(),
            text,
            tokens,
            duration_us: started.elapsed().as_micros() as u64,
        };
        output_segmentation(&result, cli_args)?;
    }
    Ok(())
}

/// Keys of every model `kind` may load under `config`.
fn model_keys(kind: StrategyKind, config: &Configuration) -> Vec<ModelKey> {
    let paths = &config.paths;
    let mut keys = Vec::new();
    let lattice = !matches!(
        kind,
        StrategyKind::PerceptronComposite | StrategyKind::CrfComposite
    );
    if lattice || config.index_mode {
        keys.push(ModelKey::new(ModelKind::CoreDictionary, &paths.core_dictionary));
    }
    if lattice && kind != StrategyKind::DictionaryTrie {
        keys.push(ModelKey::new(ModelKind::BigramDictionary, &paths.bigram_dictionary));
    }
    if config.custom_dictionary {
        for path in &paths.custom_dictionaries {
            keys.push(ModelKey::new(ModelKind::CustomDictionary, path));
        }
    }
    if config.stop_dictionary {
        keys.push(ModelKey::new(ModelKind::StopWords, &paths.stop_words));
    }
    match kind {
        StrategyKind::PerceptronComposite => {
            keys.push(ModelKey::new(ModelKind::PerceptronCws, &paths.perceptron_cws));
            keys.push(ModelKey::new(ModelKind::PerceptronPos, &paths.perceptron_pos));
            keys.push(ModelKey::new(ModelKind::PerceptronNer, &paths.perceptron_ner));
        }
        StrategyKind::CrfComposite => {
            keys.push(ModelKey::new(ModelKind::CrfCws, &paths.crf_cws));
            if let Some(path) = &paths.crf_pos {
                keys.push(ModelKey::new(ModelKind::CrfPos, path));
            }
            if let Some(path) = &paths.crf_ner {
                keys.push(ModelKey::new(ModelKind::CrfNer, path));
            }
        }
        _ => {}
    }
    keys
}

/// Build the tokenizer and report what it loaded.
fn inspect(args: &TokenizerArgs, cli_args: &HansegArgs) -> Result<()> {
    let factory = factory(args)?;
    let tokenizer = factory.create()?;
    let engine = tokenizer.engine();
    let configuration = factory.effective_configuration();

    let models = model_keys(factory.kind(), &configuration)
        .into_iter()
        .map(|key| {
            let state = match factory.registry().state(&key) {
                ModelState::NotAttempted => "not loaded".to_string(),
                ModelState::Unavailable(failure) => format!("unavailable ({})", failure.reason),
                ModelState::Loaded(_) => "loaded".to_string(),
            };
            ModelStatus {
                model: key.to_string(),
                state,
            }
        })
        .collect();

    let result = InspectionResult {
        kind: factory.kind().name().to_string(),
        level: engine.level(),
        resolution: engine.resolution().cloned(),
        configuration,
        models,
    };
    output_inspection(&result, cli_args)
}

/// List the tokenizer types.
fn list_kinds(cli_args: &HansegArgs) -> Result<()> {
    let kinds: Vec<KindInfo> = StrategyKind::ALL
        .iter()
        .map(|kind| KindInfo {
            name: kind.name().to_string(),
            description: kind.description().to_string(),
        })
        .collect();
    output_kinds(&kinds, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer_args(kind: &str, overrides: &[&str]) -> TokenizerArgs {
        TokenizerArgs {
            kind: kind.to_string(),
            settings: None,
            overrides: overrides.iter().map(|s| s.to_string()).collect(),
            model_root: Some(PathBuf::from("/opt/hanlp")),
            config_dir: Some(PathBuf::from("/etc/hanseg")),
        }
    }

    #[test]
    fn test_overrides() {
        let settings =
            load_settings(&tokenizer_args("hanlp", &["enable_index_mode = true"])).unwrap();
        assert_eq!(settings.get("enable_index_mode"), Some("true"));

        let err = load_settings(&tokenizer_args("hanlp", &["enable_index_mode"])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_settings_file_sets_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, r#"{"enable_place_recognize": true}"#).unwrap();

        let mut args = tokenizer_args("hanlp", &[]);
        args.settings = Some(file);
        args.config_dir = None;
        args.model_root = None;

        let env = environment(&args).unwrap();
        assert_eq!(env.config_dir(), dir.path());
        assert_eq!(env.model_root(), dir.path());
        assert_eq!(load_settings(&args).unwrap().get("enable_place_recognize"), Some("true"));
    }

    #[test]
    fn test_model_keys() {
        let config = Configuration::with_root("/opt/hanlp");
        let crf: Vec<_> = model_keys(StrategyKind::CrfComposite, &config)
            .iter()
            .map(|k| k.kind())
            .collect();
        assert_eq!(
            crf,
            vec![
                ModelKind::CustomDictionary,
                ModelKind::CrfCws,
                ModelKind::CrfPos,
                ModelKind::CrfNer
            ]
        );

        let speed = StrategyKind::DictionaryTrie.effective_configuration(&config);
        let kinds: Vec<_> = model_keys(StrategyKind::DictionaryTrie, &speed)
            .iter()
            .map(|k| k.kind())
            .collect();
        assert_eq!(kinds, vec![ModelKind::CoreDictionary]);
    }
}
