//! Criterion benchmarks for hanseg.
//!
//! - Segmentation throughput of every tokenizer type
//! - Engine construction against a warm model registry

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use hanseg::analysis::tokenizer::Tokenizer;
use hanseg::factory::{StrategyKind, TokenizerFactory};
use hanseg::model::ModelRegistry;
use hanseg::settings::{Environment, Settings};
use hanseg::testing::write_models;

/// Generate test sentences from the words of the test dictionaries.
fn generate_test_sentences(count: usize) -> Vec<String> {
    let words = [
        "我", "在", "北京", "大学", "中国", "人民", "银行", "欢迎", "你", "中华人民共和国",
        "攻城狮", "来", "了", "的", "海淀区", "2024", "年",
    ];

    let mut sentences = Vec::with_capacity(count);
    for i in 0..count {
        let length = 8 + (i % 24);
        let mut sentence = String::new();
        for j in 0..length {
            sentence.push_str(words[(i * 7 + j * 13) % words.len()]);
        }
        sentence.push('。');
        sentences.push(sentence);
    }
    sentences
}

/// Benchmark segmentation per tokenizer type.
fn bench_segmentation(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path()).unwrap();
    let env = Environment::with_root(dir.path());
    let sentences = generate_test_sentences(100);

    let mut group = c.benchmark_group("segmentation");
    group.throughput(Throughput::Elements(sentences.len() as u64));
    for kind in StrategyKind::ALL {
        let tokenizer = TokenizerFactory::new(kind, &env, &Settings::new())
            .unwrap()
            .create()
            .unwrap();
        group.bench_function(kind.name(), |b| {
            b.iter(|| {
                for sentence in &sentences {
                    let tokens = tokenizer.tokenize(black_box(sentence)).unwrap();
                    black_box(tokens.count());
                }
            })
        });
    }
    group.finish();
}

/// Benchmark building engines once the models are loaded.
fn bench_engine_construction(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path()).unwrap();
    let env = Environment::with_root(dir.path());
    let registry = Arc::new(ModelRegistry::new());

    let mut group = c.benchmark_group("engine_construction");
    for kind in [StrategyKind::Default, StrategyKind::CrfComposite] {
        let factory = TokenizerFactory::new(kind, &env, &Settings::new())
            .unwrap()
            .with_registry(Arc::clone(&registry));
        factory.build_engine().unwrap();
        group.bench_function(kind.name(), |b| {
            b.iter(|| black_box(factory.build_engine().unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segmentation, bench_engine_construction);
criterion_main!(benches);
