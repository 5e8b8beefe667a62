use criterion::{black_box, criterion_group, criterion_main, Criterion};
use osm_history::data_provider::DownloadArgs;
use osm_history::historical::dispatcher::{plan, Capability};
use osm_history::historical::{resolve_historical_date, validate, DateRequest};
use std::path::PathBuf;

fn sample_args() -> DownloadArgs {
    DownloadArgs {
        primary_name: "power".to_string(),
        regions: vec!["NG".to_string(), "BJ".to_string(), "TG".to_string()],
        features: vec![
            "substation".to_string(),
            "line".to_string(),
            "cable".to_string(),
            "generator".to_string(),
            "tower".to_string(),
        ],
        data_dir: PathBuf::from("data/osm"),
        out_dir: PathBuf::from("resources/osm"),
        out_format: vec!["csv".to_string(), "geojson".to_string()],
        out_aggregate: true,
        update: false,
        parallel: true,
    }
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    group.bench_function("valid", |b| {
        b.iter(|| validate(black_box(Some("2020-02-29"))))
    });

    group.bench_function("calendar_invalid", |b| {
        b.iter(|| validate(black_box(Some("2021-02-30"))))
    });

    group.bench_function("pattern_invalid", |b| {
        b.iter(|| validate(black_box(Some("02/30/2021"))))
    });

    group.finish();
}

fn bench_resolve_and_plan(c: &mut Criterion) {
    let request = DateRequest::new(
        Some("2019-05-01".to_string()),
        Some("2021-01-01".to_string()),
    );
    let args = sample_args();

    c.bench_function("resolve_and_plan", |b| {
        b.iter(|| {
            let resolved = resolve_historical_date(black_box(&request));
            plan(resolved, Capability::SupportsHistoricalDate, args.clone())
        })
    });
}

criterion_group!(benches, bench_validate, bench_resolve_and_plan);
criterion_main!(benches);
