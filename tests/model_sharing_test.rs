use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tempfile::Builder;

use hanseg::configuration::{
    DEFAULT_BIGRAM_DICTIONARY_PATH, DEFAULT_CORE_DICTIONARY_PATH, DEFAULT_CRF_CWS_PATH,
};
use hanseg::error::Result;
use hanseg::factory::TokenizerFactory;
use hanseg::isolation::Grant;
use hanseg::model::{ModelKey, ModelKind, ModelRegistry, ModelState};
use hanseg::settings::{Environment, Settings};
use hanseg::testing::{CORE_DICTIONARY, remove_file, write_file, write_models};

#[test]
fn test_concurrent_factories_share_models() -> Result<()> {
    let dir = Builder::new().prefix("test_concurrent").tempdir()?;
    write_models(dir.path())?;
    let env = Environment::with_root(dir.path());
    let registry = Arc::new(ModelRegistry::new());
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = ["hanlp", "hanlp_standard", "hanlp_index", "hanlp", "hanlp_crf", "hanlp_crf"]
        .into_iter()
        .map(|name| {
            let env = env.clone();
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || -> Result<usize> {
                let factory = TokenizerFactory::from_name(name, &env, &Settings::new())?
                    .with_registry(registry);
                barrier.wait();
                Ok(factory.build_engine()?.segment("北京欢迎你").len())
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("builder thread panicked")? > 0);
    }

    let grant = Grant::new([dir.path()]);
    let core = ModelKey::new(
        ModelKind::CoreDictionary,
        dir.path().join(DEFAULT_CORE_DICTIONARY_PATH),
    );
    let crf = ModelKey::new(ModelKind::CrfCws, dir.path().join(DEFAULT_CRF_CWS_PATH));
    assert_eq!(registry.attempts(&core), 1);
    assert_eq!(registry.attempts(&crf), 1);
    assert!(Arc::ptr_eq(
        &registry.lexicon(&core, &grant)?,
        &registry.lexicon(&core, &grant)?
    ));
    Ok(())
}

#[test]
fn test_factories_are_lazy() -> Result<()> {
    let dir = Builder::new().prefix("test_lazy").tempdir()?;
    write_models(dir.path())?;
    let registry = Arc::new(ModelRegistry::new());

    let factory = TokenizerFactory::crf(&Environment::with_root(dir.path()), &Settings::new())?
        .with_registry(Arc::clone(&registry));
    assert!(registry.is_empty());

    factory.create()?;
    // The CRF composite never touches the lattice dictionaries.
    let core = ModelKey::new(
        ModelKind::CoreDictionary,
        dir.path().join(DEFAULT_CORE_DICTIONARY_PATH),
    );
    assert!(matches!(registry.state(&core), ModelState::NotAttempted));
    Ok(())
}

#[test]
fn test_failure_is_sticky_across_factories() -> Result<()> {
    let dir = Builder::new().prefix("test_sticky").tempdir()?;
    write_models(dir.path())?;
    remove_file(dir.path(), DEFAULT_CORE_DICTIONARY_PATH)?;
    let env = Environment::with_root(dir.path());
    let registry = Arc::new(ModelRegistry::new());

    let first = TokenizerFactory::hanlp(&env, &Settings::new())?.with_registry(Arc::clone(&registry));
    assert!(first.create().unwrap_err().is_model_unavailable());

    // Restoring the file does not revive the model for this registry.
    write_file(dir.path(), DEFAULT_CORE_DICTIONARY_PATH, CORE_DICTIONARY)?;
    let second = TokenizerFactory::speed(&env, &Settings::new())?.with_registry(Arc::clone(&registry));
    assert!(second.create().unwrap_err().is_model_unavailable());

    let core = ModelKey::new(
        ModelKind::CoreDictionary,
        dir.path().join(DEFAULT_CORE_DICTIONARY_PATH),
    );
    assert_eq!(registry.attempts(&core), 1);

    // A fresh registry reads it again.
    TokenizerFactory::speed(&env, &Settings::new())?
        .with_registry(Arc::new(ModelRegistry::new()))
        .create()?;
    Ok(())
}

#[test]
fn test_missing_optional_dictionary_is_remembered() -> Result<()> {
    let dir = Builder::new().prefix("test_optional").tempdir()?;
    write_models(dir.path())?;
    remove_file(dir.path(), DEFAULT_BIGRAM_DICTIONARY_PATH)?;
    let env = Environment::with_root(dir.path());
    let registry = Arc::new(ModelRegistry::new());

    for _ in 0..3 {
        TokenizerFactory::hanlp(&env, &Settings::new())?
            .with_registry(Arc::clone(&registry))
            .create()?;
    }
    let bigram = ModelKey::new(
        ModelKind::BigramDictionary,
        dir.path().join(DEFAULT_BIGRAM_DICTIONARY_PATH),
    );
    assert!(registry.state(&bigram).is_unavailable());
    assert_eq!(registry.attempts(&bigram), 1);
    Ok(())
}

#[test]
fn test_bounded_wait() -> Result<()> {
    let dir = Builder::new().prefix("test_bounded_wait").tempdir()?;
    write_models(dir.path())?;
    let registry = Arc::new(ModelRegistry::new());
    let grant = Grant::new([dir.path()]);
    let core = ModelKey::new(
        ModelKind::CoreDictionary,
        dir.path().join(DEFAULT_CORE_DICTIONARY_PATH),
    );

    let handle = registry.get_or_build_timeout(&core, &grant, Duration::from_secs(10))?;
    assert!(handle.as_lexicon().is_some());
    assert!(registry.state(&core).is_loaded());

    // Already published: answered without waiting.
    let again = registry.get_or_build_timeout(&core, &grant, Duration::ZERO)?;
    assert!(again.ptr_eq(&handle));
    Ok(())
}

#[test]
fn test_model_root_outside_grant() -> Result<()> {
    let granted = Builder::new().prefix("test_granted").tempdir()?;
    let elsewhere = Builder::new().prefix("test_elsewhere").tempdir()?;
    write_models(elsewhere.path())?;

    let env = Environment::with_root(granted.path());
    let settings = Settings::new().with("model_root", elsewhere.path().to_string_lossy());
    let factory = TokenizerFactory::hanlp(&env, &settings)?.with_registry(Arc::new(ModelRegistry::new()));

    let err = factory.create().unwrap_err();
    assert!(err.is_isolation_violation());
    assert_eq!(err.subjects(), vec!["hanlp"]);
    Ok(())
}

#[test]
fn test_optional_model_outside_grant_is_fatal() -> Result<()> {
    let granted = Builder::new().prefix("test_granted_optional").tempdir()?;
    let elsewhere = Builder::new().prefix("test_elsewhere_optional").tempdir()?;
    write_models(granted.path())?;
    let stray = write_file(elsewhere.path(), "stopwords.txt", "的\n")?;

    let env = Environment::with_root(granted.path());
    let settings = Settings::new()
        .with("enable_stop_dictionary", "true")
        .with("stop_words_path", stray.to_string_lossy());
    let factory = TokenizerFactory::hanlp(&env, &settings)?.with_registry(Arc::new(ModelRegistry::new()));

    let err = factory.create().unwrap_err();
    assert!(err.is_isolation_violation());
    assert_eq!(err.subjects(), vec!["hanlp"]);
    Ok(())
}

#[test]
fn test_violation_does_not_leak_between_factories() -> Result<()> {
    let granted = Builder::new().prefix("test_leak_granted").tempdir()?;
    let models = Builder::new().prefix("test_leak_models").tempdir()?;
    write_models(models.path())?;

    let outsider_env = Environment::with_root(granted.path());
    let outsider_settings = Settings::new().with("model_root", models.path().to_string_lossy());
    let owner_env = Environment::with_root(models.path());
    let core = ModelKey::new(
        ModelKind::CoreDictionary,
        models.path().join(DEFAULT_CORE_DICTIONARY_PATH),
    );

    // A refused request does not poison the model for factories allowed to read it.
    let registry = Arc::new(ModelRegistry::new());
    let outsider = TokenizerFactory::hanlp(&outsider_env, &outsider_settings)?
        .with_registry(Arc::clone(&registry));
    let owner = TokenizerFactory::hanlp(&owner_env, &Settings::new())?
        .with_registry(Arc::clone(&registry));
    assert!(outsider.create().unwrap_err().is_isolation_violation());
    assert!(matches!(registry.state(&core), ModelState::NotAttempted));
    owner.create()?;
    assert!(registry.state(&core).is_loaded());

    // A loaded model is not handed to a factory whose grant excludes it.
    let registry = Arc::new(ModelRegistry::new());
    let owner = owner.with_registry(Arc::clone(&registry));
    let outsider = outsider.with_registry(Arc::clone(&registry));
    owner.create()?;
    let err = outsider.create().unwrap_err();
    assert!(err.is_isolation_violation());
    assert_eq!(err.subjects(), vec!["hanlp"]);
    assert_eq!(registry.attempts(&core), 1);
    Ok(())
}
