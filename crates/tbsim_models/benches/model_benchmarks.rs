//! Benchmarks for tbsim_models.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tbsim_models::calibration::{BetaCalibrator, CalibrationConfig};
use tbsim_models::districts::{DistrictInput, DistrictRunner};
use tbsim_models::parameters::ParameterSet;
use tbsim_models::simulation::Simulator;
use tbsim_models::DEFAULT_BETA;

fn benchmark_simulation(c: &mut Criterion) {
    let simulator = Simulator::new(ParameterSet::default());
    let mut group = c.benchmark_group("simulate");

    for years in [1_u32, 5, 10, 15] {
        group.bench_with_input(BenchmarkId::from_parameter(years), &years, |b, &years| {
            b.iter(|| simulator.run(black_box(DEFAULT_BETA), years, black_box(1_000_000)))
        });
    }

    group.finish();
}

fn benchmark_calibration(c: &mut Criterion) {
    let calibrator = BetaCalibrator::new(ParameterSet::default(), CalibrationConfig::default());

    c.bench_function("calibrate_1950_in_500k", |b| {
        b.iter(|| calibrator.calibrate(black_box(1950.0), black_box(500_000)))
    });

    // Needs the first upper-bound expansion
    c.bench_function("calibrate_30000_in_1m", |b| {
        b.iter(|| calibrator.calibrate(black_box(30_000.0), black_box(1_000_000)))
    });
}

fn benchmark_districts(c: &mut Criterion) {
    let runner = DistrictRunner::new(ParameterSet::default()).with_years(10);
    let inputs: Vec<_> = (0..16)
        .map(|i| DistrictInput::new(format!("district_{}", i), 500_000, 1500.0 + 100.0 * i as f64))
        .collect();

    c.bench_function("districts_16", |b| b.iter(|| runner.run_all(black_box(&inputs))));
}

criterion_group!(
    benches,
    benchmark_simulation,
    benchmark_calibration,
    benchmark_districts
);
criterion_main!(benches);
