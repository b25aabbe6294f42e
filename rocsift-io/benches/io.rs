use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rocsift_core::{CurveSet, RocCurve};
use rocsift_io::{parse_csv_str, parse_json_str, write_csv_string, write_json_string, JsonOptions};

fn synthetic_set(curves: usize, points: usize) -> CurveSet {
    (0..curves)
        .map(|c| {
            let power = 1.0 + c as f64;
            let fpr: Vec<f64> = (0..points).map(|i| i as f64 / (points - 1) as f64).collect();
            let tpr: Vec<f64> = fpr.iter().map(|x| x.powf(1.0 / power)).collect();
            let curve = RocCurve::new(fpr, tpr).expect("synthetic curve is canonical");
            (format!("model_{c}"), curve)
        })
        .collect()
}

fn bench_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv");

    let text = write_csv_string(&synthetic_set(10, 1_000)).expect("export");
    group.bench_function("parse_10x1k", |b| {
        b.iter(|| parse_csv_str(black_box(&text)))
    });

    let set = synthetic_set(10, 1_000);
    group.bench_function("write_10x1k", |b| {
        b.iter(|| write_csv_string(black_box(&set)))
    });

    group.finish();
}

fn bench_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("json");

    let text = write_json_string(&synthetic_set(10, 1_000)).expect("export");
    let options = JsonOptions::default();
    group.bench_function("parse_10x1k", |b| {
        b.iter(|| parse_json_str(black_box(&text), &options))
    });

    group.finish();
}

criterion_group!(benches, bench_csv, bench_json);
criterion_main!(benches);
