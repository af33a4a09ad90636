use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use depscreen::inference::ScoringEngine;
use depscreen::schema::{Department, FeatureRecord, Reason};
use depscreen::training::{ForestParams, Trainer, TrainingConfig};
use polars::prelude::*;
use rand::prelude::*;

fn create_survey_data(n_rows: usize) -> DataFrame {
    let mut rng = rand::thread_rng();

    let mut usage = Vec::with_capacity(n_rows);
    let mut duration = Vec::with_capacity(n_rows);
    let mut attempts = Vec::with_capacity(n_rows);
    let mut confidence = Vec::with_capacity(n_rows);
    let mut peer = Vec::with_capacity(n_rows);
    let mut reason = Vec::with_capacity(n_rows);
    let mut cgpa = Vec::with_capacity(n_rows);
    let mut department = Vec::with_capacity(n_rows);
    let mut other_ai = Vec::with_capacity(n_rows);
    let mut prefers = Vec::with_capacity(n_rows);
    let mut label = Vec::with_capacity(n_rows);

    for i in 0..n_rows {
        let dependent = i % 2 == 1;
        reason.push(Reason::ALL.choose(&mut rng).unwrap().as_str());
        department.push(Department::ALL.choose(&mut rng).unwrap().as_str());

        if dependent {
            usage.push(rng.gen_range(8i64..=20));
            duration.push(rng.gen_range(60i64..=180));
            attempts.push(rng.gen_range(0i64..=2));
            confidence.push(rng.gen_range(1i64..=2));
            peer.push(rng.gen_range(3i64..=5));
            cgpa.push(rng.gen_range(5.0..7.5));
            other_ai.push(1i64);
            prefers.push(1i64);
            label.push(1i64);
        } else {
            usage.push(rng.gen_range(0i64..=6));
            duration.push(rng.gen_range(5i64..=45));
            attempts.push(rng.gen_range(2i64..=8));
            confidence.push(rng.gen_range(3i64..=5));
            peer.push(rng.gen_range(1i64..=3));
            cgpa.push(rng.gen_range(7.0..10.0));
            other_ai.push(0i64);
            prefers.push(0i64);
            label.push(0i64);
        }
    }

    df!(
        "chatgpt_usage_frequency_per_week" => usage,
        "average_duration_per_session_minutes" => duration,
        "attempt_before_chatgpt" => attempts,
        "confidence_in_solving_alone" => confidence,
        "peer_usage_influence" => peer,
        "reason_for_using_chatgpt" => reason,
        "cgpa" => cgpa,
        "department" => department,
        "used_other_ai_tools" => other_ai,
        "chatgpt_preferred_over_google" => prefers,
        "chatgpt_dependence" => label,
    )
    .unwrap()
}

fn forest_config() -> TrainingConfig {
    TrainingConfig::new().with_params(ForestParams {
        n_estimators: 50,
        max_depth: Some(12),
        min_samples_split: 2,
        min_samples_leaf: 1,
    })
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [200, 1000, 5000].iter() {
        let df = create_survey_data(*n_rows);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &df, |b, df| {
            b.iter(|| {
                let trainer = Trainer::new(forest_config());
                trainer.train(black_box(df)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_assessment(c: &mut Criterion) {
    let mut group = c.benchmark_group("assessment");

    // Train model once
    let outcome = Trainer::new(forest_config())
        .train(&create_survey_data(500))
        .unwrap();
    let engine = ScoringEngine::from_model(outcome.model);

    let record = FeatureRecord {
        chatgpt_usage_frequency_per_week: 12,
        confidence_in_solving_alone: 2,
        peer_usage_influence: 4,
        ..FeatureRecord::default()
    };

    group.bench_function("assess_one", |b| {
        b.iter(|| engine.assess(black_box(&record)).unwrap())
    });

    for n_rows in [100, 1000].iter() {
        let test_df = create_survey_data(*n_rows);

        group.bench_with_input(BenchmarkId::new("predict", n_rows), &test_df, |b, df| {
            b.iter(|| engine.model().predict(black_box(df)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_assessment);
criterion_main!(benches);
