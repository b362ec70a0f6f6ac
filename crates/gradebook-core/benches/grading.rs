use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradebook_core::grading::{aggregate_grid_totals, final_grade, select_best_questions};
use gradebook_core::model::{Evaluation, Indicator, Objective, ScoringMode};

fn make_rubric(objectives: usize, indicators: usize) -> Vec<Objective> {
    (0..objectives)
        .map(|o| Objective {
            id: format!("o{o}"),
            number: o as u32 + 1,
            weight: (o % 3 + 1) as u32,
            indicators: (0..indicators)
                .map(|i| Indicator {
                    id: format!("i{i}"),
                    weight: (i % 9 + 1) as u32,
                    question_number: Some((o * indicators + i) as u32 + 1),
                })
                .collect(),
        })
        .collect()
}

fn make_evaluations(rubric: &[Objective]) -> Vec<Evaluation> {
    rubric
        .iter()
        .flat_map(|o| {
            o.indicators
                .iter()
                .enumerate()
                .map(|(i, ind)| Evaluation::new(&o.id, &ind.id).with_score((i % 4) as u8))
        })
        .collect()
}

fn bench_final_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("final_grade");

    group.bench_function("below_threshold", |b| {
        b.iter(|| final_grade(black_box(30.0), black_box(100.0), black_box(0.6), black_box(0.0)))
    });

    group.bench_function("above_threshold", |b| {
        b.iter(|| final_grade(black_box(75.0), black_box(100.0), black_box(0.6), black_box(-0.1)))
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_grid_totals");

    for (objectives, indicators) in [(3, 5), (10, 10), (20, 25)] {
        let rubric = make_rubric(objectives, indicators);
        let evaluations = make_evaluations(&rubric);
        group.bench_function(format!("{objectives}x{indicators}"), |b| {
            b.iter(|| {
                aggregate_grid_totals(
                    black_box(&rubric),
                    black_box(&evaluations),
                    ScoringMode::Weighted,
                )
            })
        });
    }

    group.finish();
}

fn bench_select_best_questions(c: &mut Criterion) {
    let rubric = make_rubric(10, 10);
    let evaluations = make_evaluations(&rubric);

    c.bench_function("select_best_questions_keep_50_of_100", |b| {
        b.iter(|| {
            select_best_questions(
                black_box(&rubric),
                black_box(&evaluations),
                50,
                ScoringMode::Weighted,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_final_grade,
    bench_aggregate,
    bench_select_best_questions
);
criterion_main!(benches);
