//! Benchmarks for the All-or-Fold trainer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use aof_solver::cfr::{Trainer, TrainerConfig};
use aof_solver::games::aof::{AofGame, Card, Deck, PokerEvaluator};

fn aof_iteration_benchmark(c: &mut Criterion) {
    let config = TrainerConfig::default().with_seed(42);
    let mut trainer = Trainer::new(AofGame::default(), config).unwrap();

    c.bench_function("aof_single_iteration", |b| {
        b.iter(|| black_box(trainer.run_iteration().unwrap()))
    });
}

fn aof_1000_iterations_benchmark(c: &mut Criterion) {
    c.bench_function("aof_1000_iterations", |b| {
        b.iter(|| {
            let config = TrainerConfig::default().with_seed(42);
            let mut trainer = Trainer::new(AofGame::default(), config).unwrap();
            trainer.train(black_box(1000)).unwrap().info_sets
        })
    });
}

fn evaluate_7_benchmark(c: &mut Criterion) {
    let mut deck = Deck::from_seed(42);
    let hands: Vec<[Card; 7]> = (0..7)
        .map(|_| deck.deal_array::<7>().unwrap())
        .collect();
    let evaluator = PokerEvaluator;

    c.bench_function("evaluate_7", |b| {
        b.iter(|| {
            for hand in &hands {
                black_box(evaluator.evaluate_7(black_box(hand)));
            }
        })
    });
}

criterion_group!(
    benches,
    aof_iteration_benchmark,
    aof_1000_iterations_benchmark,
    evaluate_7_benchmark
);
criterion_main!(benches);
