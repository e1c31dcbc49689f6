use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kolosal_chrono::imputation::impute_timesteps;
use kolosal_chrono::selection::{FeatureSelectionStrategy, SelectionRequest, XGBoostFeatureSelector};
use kolosal_chrono::timeseries::WindowFeatureGenerator;
use polars::prelude::*;
use rand::prelude::*;

fn create_series_data(n_rows: usize) -> DataFrame {
    let mut rng = rand::thread_rng();

    let steps: Vec<i64> = (0..n_rows as i64).collect();
    let values: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 10.0).collect();
    let target: Vec<f64> = values
        .iter()
        .map(|v| v * 2.0 + rng.gen::<f64>() * 0.1)
        .collect();

    df!("step" => steps, "value" => values, "target" => target).unwrap()
}

fn bench_window_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_features");

    for n_rows in [1_000, 10_000, 100_000].iter() {
        let df = create_series_data(*n_rows);

        group.bench_with_input(BenchmarkId::new("generate_w10", n_rows), &df, |b, df| {
            b.iter(|| {
                let mut data = df.clone();
                WindowFeatureGenerator::new(10)
                    .generate(black_box(&mut data), "value")
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_timestep_imputation(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestep_imputation");

    for n_rows in [1_000, 10_000].iter() {
        // Drop every third step to leave gaps
        let df = create_series_data(*n_rows);
        let mask = BooleanChunked::from_iter_values("mask".into(), (0..*n_rows).map(|i| i % 3 != 0));
        let gappy = df.filter(&mask).unwrap();

        group.bench_with_input(BenchmarkId::new("integer", n_rows), &gappy, |b, df| {
            b.iter(|| impute_timesteps(black_box(df.clone()), "step").unwrap())
        });
    }

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    group.sample_size(10);

    let mut df = create_series_data(2_000);
    let candidates = WindowFeatureGenerator::new(5).generate(&mut df, "value").unwrap();
    let request = SelectionRequest::new(candidates, "target", "step");
    let selector = XGBoostFeatureSelector::new(5);

    group.bench_function("rank_20_features", |b| {
        b.iter(|| selector.rank_features(black_box(&df), &request).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_window_features, bench_timestep_imputation, bench_selection);
criterion_main!(benches);
