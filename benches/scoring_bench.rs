//! Benchmarks for pillar scoring and the content cache
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use finhealth::localization::{
    CacheConfig, ContentCache, ContentKey, ContentType, Language, LocalizedContent,
};
use finhealth::scoring::{calculate_pillar_percentage, pillar_histogram, PillarScore};
use std::time::Duration;

const PILLARS: [&str; 7] = [
    "income_stream",
    "monthly_expenses",
    "savings_habit",
    "debt_management",
    "retirement_planning",
    "protection",
    "future_planning",
];

fn create_scores(count: usize) -> Vec<PillarScore> {
    (0..count)
        .map(|i| {
            let score = PillarScore::new(PILLARS[i % PILLARS.len()], (i % 50) as f64 / 10.0);
            match i % 3 {
                0 => score,
                1 => score.max_score(5.0),
                _ => score.percentage((i % 101) as f64),
            }
        })
        .collect()
}

fn create_content(count: usize) -> Vec<LocalizedContent> {
    (0..count)
        .map(|i| {
            LocalizedContent::new(
                ContentType::Ui,
                format!("key.{}", i),
                Language::En,
                format!("Translated string number {}", i),
            )
        })
        .collect()
}

fn bench_percentage(c: &mut Criterion) {
    let mut group = c.benchmark_group("percentage");

    let scores = create_scores(1000);
    group.throughput(Throughput::Elements(scores.len() as u64));

    group.bench_function("calculate_1000", |b| {
        b.iter(|| {
            scores
                .iter()
                .map(|s| calculate_pillar_percentage(black_box(s)))
                .sum::<f64>()
        })
    });

    group.finish();
}

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");

    for size in [1000, 10000, 100000] {
        let scores = create_scores(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("width_10_{}", size), |b| {
            b.iter(|| pillar_histogram(black_box(&scores), 10))
        });
    }

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_cache");

    let config = CacheConfig {
        ttl: Duration::from_secs(300),
        ..CacheConfig::default()
    };
    let keys: Vec<ContentKey> = Language::ALL
        .into_iter()
        .flat_map(|language| {
            ContentType::ALL
                .into_iter()
                .map(move |content_type| ContentKey::new(content_type, language))
        })
        .collect();
    let content = create_content(200);

    group.bench_function("insert_all_types", |b| {
        b.iter(|| {
            let mut cache = ContentCache::new(config.clone());
            for key in &keys {
                cache.insert(*key, content.clone());
            }
            cache.len()
        })
    });

    group.bench_function("get_hit", |b| {
        let mut cache = ContentCache::new(config.clone());
        for key in &keys {
            cache.insert(*key, content.clone());
        }

        b.iter(|| {
            for key in &keys {
                black_box(cache.get(key));
            }
        });
    });

    group.bench_function("evict_lru", |b| {
        let small = CacheConfig {
            max_entries: 3,
            ..config.clone()
        };

        b.iter(|| {
            let mut cache = ContentCache::new(small.clone());
            for key in &keys {
                cache.insert(*key, content.clone());
            }
            cache.stats().evictions
        })
    });

    group.finish();
}

criterion_group!(benches, bench_percentage, bench_histogram, bench_cache);
criterion_main!(benches);
