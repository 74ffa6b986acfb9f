use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use certify_core::bank::builtin_bank;
use certify_core::model::{OptionLabel, QuestionRecord};
use certify_core::scoring::{score, Answers};
use certify_core::selection::{select, SelectionMode};

const TOPICS: [&str; 5] = [
    "Billing and Pricing",
    "Cloud Concepts",
    "Core Services",
    "Security and Compliance",
    "Technology",
];

fn make_questions(n: usize) -> Vec<QuestionRecord> {
    (0..n)
        .map(|i| {
            QuestionRecord::from_choices(
                format!("Question {i}?"),
                ["alpha", "beta", "gamma", "delta"],
                OptionLabel::ALL[i % 4],
                TOPICS[i % TOPICS.len()],
            )
            .unwrap()
        })
        .collect()
}

fn make_answers(n: usize) -> Answers {
    // Roughly two thirds answered, a third of those correct.
    (0..n)
        .filter(|i| i % 3 != 0)
        .map(|i| (i, ["alpha", "beta", "gamma", "delta"][i % 3].to_string()))
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let universe: Vec<String> = TOPICS.iter().map(|s| s.to_string()).collect();

    for n in [5, 50, 500] {
        let questions = make_questions(n);
        let answers = make_answers(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers), black_box(&universe)))
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let bank = builtin_bank().unwrap();
    let topics: Vec<String> = TOPICS.iter().map(|s| s.to_string()).collect();

    group.bench_function("random_sample", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            select(
                black_box(&bank.questions),
                black_box(&topics),
                10,
                SelectionMode::RandomSample,
                &mut rng,
            )
        })
    });

    group.bench_function("prefix", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            select(
                black_box(&bank.questions),
                black_box(&topics),
                10,
                SelectionMode::Prefix,
                &mut rng,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_score, bench_select);
criterion_main!(benches);
