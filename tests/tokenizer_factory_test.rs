use std::sync::Arc;

use tempfile::{Builder, TempDir};

use hanseg::analysis::analyzer::Analyzer;
use hanseg::analysis::token::Token;
use hanseg::analysis::tokenizer::Tokenizer;
use hanseg::error::Result;
use hanseg::factory::{StrategyKind, TokenizerFactory};
use hanseg::model::ModelRegistry;
use hanseg::settings::{Environment, Settings};
use hanseg::testing::write_models;

fn model_root(prefix: &str) -> Result<TempDir> {
    let dir = Builder::new().prefix(prefix).tempdir()?;
    write_models(dir.path())?;
    Ok(dir)
}

fn factory(name: &str, dir: &TempDir, settings: &Settings) -> Result<TokenizerFactory> {
    Ok(TokenizerFactory::from_name(name, &Environment::with_root(dir.path()), settings)?
        .with_registry(Arc::new(ModelRegistry::new())))
}

fn texts(factory: &TokenizerFactory, text: &str) -> Result<Vec<String>> {
    Ok(factory.create()?.tokenize(text)?.map(|t| t.text).collect())
}

#[test]
fn test_every_declared_type_builds() -> Result<()> {
    let dir = model_root("test_every_type")?;
    for kind in StrategyKind::ALL {
        let factory = factory(kind.name(), &dir, &Settings::new())?;
        let tokenizer = factory.create()?;
        assert_eq!(tokenizer.name(), kind.name());
        assert!(tokenizer.tokenize("我在北京")?.count() > 0, "{kind}");
    }
    Ok(())
}

#[test]
fn test_unknown_type_is_a_configuration_error() -> Result<()> {
    let dir = model_root("test_unknown_type")?;
    let err = factory("hanlp_fast", &dir, &Settings::new()).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("hanlp_crf"));
    Ok(())
}

#[test]
fn test_graph_engines_force_place_recognition() -> Result<()> {
    let dir = model_root("test_graph_engines")?;
    let settings = Settings::new();

    assert_eq!(
        texts(&factory("hanlp_standard", &dir, &settings)?, "我在海淀区")?,
        vec!["我", "在", "海", "淀", "区"]
    );
    for name in ["hanlp_dijkstra", "hanlp_n_short"] {
        assert_eq!(
            texts(&factory(name, &dir, &settings)?, "我在海淀区")?,
            vec!["我", "在", "海淀区"],
            "{name}"
        );
    }
    Ok(())
}

#[test]
fn test_graph_engines_ignore_custom_dictionary() -> Result<()> {
    let dir = model_root("test_graph_custom")?;
    let settings = Settings::new().with("enable_custom_dictionary", "true");

    assert_eq!(texts(&factory("hanlp", &dir, &settings)?, "攻城狮")?, vec!["攻城狮"]);
    assert_eq!(
        texts(&factory("hanlp_dijkstra", &dir, &settings)?, "攻城狮")?,
        vec!["攻", "城", "狮"]
    );
    Ok(())
}

#[test]
fn test_index_mode_emits_overlapping_tokens() -> Result<()> {
    let dir = model_root("test_index_mode")?;

    let standard: Vec<Token> = factory("hanlp_standard", &dir, &Settings::new())?
        .create()?
        .tokenize("中华人民共和国")?
        .collect();
    assert_eq!(standard.len(), 1);

    let index: Vec<Token> = factory("hanlp_index", &dir, &Settings::new())?
        .create()?
        .tokenize("中华人民共和国")?
        .collect();
    assert_eq!(index[0].text, "中华人民共和国");
    assert_eq!(index[0].position_increment, 1);

    let sub_words: Vec<&str> = index[1..].iter().map(|t| t.text.as_str()).collect();
    assert!(sub_words.contains(&"中华"));
    assert!(sub_words.contains(&"共和国"));
    for token in &index[1..] {
        assert_eq!(token.position_increment, 0);
        assert_eq!(token.position, 0);
        assert!(token.start_offset >= index[0].start_offset);
        assert!(token.end_offset <= index[0].end_offset);
    }
    Ok(())
}

#[test]
fn test_stop_words_and_part_of_speech_from_settings() -> Result<()> {
    let dir = model_root("test_stop_pos")?;
    let settings = Settings::from_json_str(
        r#"{"enable_stop_dictionary": true, "enable_part_of_speech_tagging": "true"}"#,
    )?;

    let analyzer = factory("hanlp", &dir, &settings)?.create_analyzer()?;
    assert_eq!(analyzer.name(), "hanlp");

    let tokens: Vec<Token> = analyzer.analyze("我的中国")?.collect();
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["我", "中国"]);
    assert_eq!(tokens[1].attribute("pos"), Some("ns"));
    assert_eq!(tokens[1].position, 2);
    assert_eq!(tokens[1].position_increment, 2);
    Ok(())
}

#[test]
fn test_missing_core_dictionary_names_the_strategy() -> Result<()> {
    let dir = model_root("test_missing_core")?;
    hanseg::testing::remove_file(
        dir.path(),
        hanseg::configuration::DEFAULT_CORE_DICTIONARY_PATH,
    )?;

    let err = factory("hanlp_speed", &dir, &Settings::new())?
        .create()
        .unwrap_err();
    assert!(err.is_model_unavailable());
    assert_eq!(err.subjects(), vec!["hanlp_speed"]);
    assert!(err.to_string().contains("hanlp_speed"));
    Ok(())
}

#[test]
fn test_invalid_toggle_value_is_rejected() -> Result<()> {
    let dir = model_root("test_invalid_toggle")?;
    let settings = Settings::new().with("enable_index_mode", "sometimes");
    let err = factory("hanlp", &dir, &settings).unwrap_err();
    assert!(err.is_configuration());
    Ok(())
}
