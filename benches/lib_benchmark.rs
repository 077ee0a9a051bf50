use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zhl16_deco::{
    ceiling::ceiling,
    compute_schedule, no_decompression_limit, stop_ladder,
    tissue::{load, load_linear},
    zhl16::COMPARTMENTS,
    DecoConfig, DecompressionScheduler, DiveState, Segment, StopSolver, FN2,
};

fn benchmark_tissue_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("tissue_calculations");

    group.bench_function("tissue_saturation", |b| {
        b.iter(|| load(black_box(0.79), 3.16, 1.0 / 60.0, COMPARTMENTS[0].half_time_minutes))
    });

    group.bench_function("tissue_desaturation", |b| {
        b.iter(|| load(black_box(3.0), 0.79, 1.0 / 60.0, COMPARTMENTS[0].half_time_minutes))
    });

    group.bench_function("tissue_descent", |b| {
        b.iter(|| load_linear(black_box(0.79), 0.79, 1.58, 2.0, COMPARTMENTS[0].half_time_minutes))
    });

    group.finish();
}

fn benchmark_ceiling_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ceiling_calculations");
    let state = DiveState::default()
        .advance(&[Segment::level(40.0, 30.0, FN2)])
        .unwrap();

    group.bench_function("single_tissue_ceiling", |b| {
        b.iter(|| ceiling(black_box(3.0), &COMPARTMENTS[0], 100.0, 1.0))
    });

    group.bench_function("controlling_compartment", |b| {
        b.iter(|| black_box(&state).controlling_compartment(100.0))
    });

    group.finish();
}

fn benchmark_ndl_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ndl_calculations");
    let state = DiveState::default()
        .advance(&[Segment::travel(30.0, 1.5, FN2)])
        .unwrap();

    group.bench_function("ndl_30m", |b| {
        b.iter(|| no_decompression_limit(black_box(&state), 30.0, FN2, 100.0))
    });

    group.finish();
}

fn benchmark_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule");
    let state = DiveState::default()
        .advance(&[Segment::level(40.0, 60.0, FN2)])
        .unwrap();
    let ladder = stop_ladder(3.0, 30.0).unwrap();

    group.bench_function("closed_form_40m_60min", |b| {
        b.iter(|| compute_schedule(black_box(&state), &ladder, 100.0))
    });

    let stepwise = DecompressionScheduler::new(DecoConfig::default().with_solver(
        StopSolver::Stepwise {
            step_minutes: 1.0 / 60.0,
        },
    ));
    group.bench_function("stepwise_40m_60min", |b| {
        b.iter(|| stepwise.compute_schedule(black_box(&state), &ladder))
    });

    group.finish();
}

fn benchmark_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dive_simulation");

    // one level segment per second, twenty minutes at 20 m
    let per_second = [Segment::level(20.0, 1.0 / 60.0, FN2); 1200];
    group.bench_function("advance_20m_20min", |b| {
        b.iter(|| DiveState::default().advance(black_box(&per_second)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_tissue_calculations,
    benchmark_ceiling_calculations,
    benchmark_ndl_calculations,
    benchmark_schedule,
    benchmark_simulation
);
criterion_main!(benches);
